use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use super::topic::Topic;
use super::{Dispatcher, SharedDispatcher};
use crate::dispatcher::message::Message;
use crate::subscriber::{Receive, Subscriber, SubscriberId, Transcript};
use crate::utils::error::{DeliveryError, DispatchError};

/// Test receiver that logs `"<name>:<payload>"` and can be told to fail.
struct Recorder {
    id: SubscriberId,
    name: String,
    log: Transcript,
    calls: AtomicUsize,
    fail: bool,
}

impl Recorder {
    fn new(name: &str, log: &Transcript) -> Arc<Self> {
        Self::build(name, log, false)
    }

    fn failing(name: &str, log: &Transcript) -> Arc<Self> {
        Self::build(name, log, true)
    }

    fn build(name: &str, log: &Transcript, fail: bool) -> Arc<Self> {
        Arc::new(Self {
            id: SubscriberId::generate(),
            name: name.to_string(),
            log: log.clone(),
            calls: AtomicUsize::new(0),
            fail,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Receive for Recorder {
    fn id(&self) -> &SubscriberId {
        &self.id
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn receive(&self, message: &Message) -> Result<(), DeliveryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.push(format!("{}:{}", self.name, message.payload));
        if self.fail {
            return Err(DeliveryError::Rejected("mailbox full".to_string()));
        }
        Ok(())
    }
}

fn newsletters() -> Dispatcher {
    Dispatcher::new(["Tech", "Travel", "Fashion"])
}

#[test]
fn test_topic_new() {
    let topic = Topic::new("test_topic");
    assert_eq!(topic.name, "test_topic");
    assert!(topic.is_empty());
}

#[test]
fn test_topic_subscribe_overwrites_in_place() {
    let log = Transcript::new();
    let a = Recorder::new("a", &log);
    let b = Recorder::new("b", &log);
    let mut topic = Topic::new("test_topic");

    assert!(topic.subscribe(a.clone()));
    assert!(topic.subscribe(b.clone()));
    assert!(!topic.subscribe(a.clone()));

    assert_eq!(topic.len(), 2);
    assert_eq!(topic.subscribers()[0].id(), a.id());
    assert_eq!(topic.subscribers()[1].id(), b.id());
}

#[test]
fn test_topic_unsubscribe() {
    let log = Transcript::new();
    let a = Recorder::new("a", &log);
    let mut topic = Topic::new("test_topic");
    topic.subscribe(a.clone());

    assert!(topic.unsubscribe(a.id()));
    assert!(!topic.contains(a.id()));
    assert!(!topic.unsubscribe(a.id()));
}

#[test]
fn test_new_newsletters_have_no_subscriptions() {
    let dispatcher = newsletters();
    for name in ["Tech", "Travel", "Fashion"] {
        assert!(dispatcher.get_subscriptions(name).unwrap().is_empty());
    }
    assert_eq!(dispatcher.newsletters(), vec!["Fashion", "Tech", "Travel"]);
}

#[test]
fn test_register_and_unregister_subscriber() {
    let mut dispatcher = newsletters();
    let john = Arc::new(Subscriber::new("John"));

    dispatcher.register("Tech", john.clone()).unwrap();
    let subs = dispatcher.get_subscriptions("Tech").unwrap();
    assert!(subs.contains(john.id()));
    assert_eq!(subs.get(john.id()).unwrap().name(), "John");

    assert_eq!(dispatcher.unregister("Tech", john.id()), Ok(true));
    assert!(!dispatcher.get_subscriptions("Tech").unwrap().contains(john.id()));
}

#[test]
fn test_unregister_absent_subscriber_is_noop() {
    let mut dispatcher = newsletters();
    let id = SubscriberId::generate();
    assert_eq!(dispatcher.unregister("Tech", &id), Ok(false));
}

#[test]
fn test_double_registration_keeps_one_entry() {
    let mut dispatcher = newsletters();
    let log = Transcript::new();
    let tom = Recorder::new("Tom", &log);

    dispatcher.register("Tech", tom.clone()).unwrap();
    dispatcher.register("Tech", tom.clone()).unwrap();

    let subs = dispatcher.get_subscriptions("Tech").unwrap();
    assert_eq!(subs.len(), 1);

    dispatcher.dispatch("Tech", "once").unwrap();
    assert_eq!(tom.calls(), 1);
}

#[test]
fn test_unknown_topic_is_not_found_everywhere() {
    let mut dispatcher = newsletters();
    let sub = Arc::new(Subscriber::new("Tom"));
    let missing = || DispatchError::TopicNotFound("Videogames".to_string());

    assert_eq!(
        dispatcher.get_subscriptions("Videogames").unwrap_err(),
        missing()
    );
    assert_eq!(
        dispatcher.register("Videogames", sub.clone()).unwrap_err(),
        missing()
    );
    assert_eq!(
        dispatcher.unregister("Videogames", sub.id()).unwrap_err(),
        missing()
    );
    assert_eq!(
        dispatcher.dispatch("Videogames", "hello").unwrap_err(),
        missing()
    );
    assert_eq!(missing().to_string(), "topic not found: Videogames");
}

#[test]
fn test_dispatch_reaches_only_topic_subscribers_in_order() {
    let mut dispatcher = newsletters();
    let log = Transcript::new();
    let first = Recorder::new("first", &log);
    let second = Recorder::new("second", &log);
    let third = Recorder::new("third", &log);
    let other = Recorder::new("other", &log);

    dispatcher.register("Travel", first.clone()).unwrap();
    dispatcher.register("Travel", second.clone()).unwrap();
    dispatcher.register("Travel", third.clone()).unwrap();
    dispatcher.register("Fashion", other.clone()).unwrap();

    let report = dispatcher.dispatch("Travel", "Rome").unwrap();

    assert_eq!(report.delivered, 3);
    assert!(report.is_clean());
    assert_eq!(log.lines(), vec!["first:Rome", "second:Rome", "third:Rome"]);
    assert_eq!(other.calls(), 0);
}

#[test]
fn test_dispatch_without_subscribers_is_noop() {
    let dispatcher = newsletters();
    let report = dispatcher.dispatch("Fashion", "nobody home").unwrap();
    assert_eq!(report.attempted(), 0);
}

#[test]
fn test_failing_subscriber_does_not_stop_fanout() {
    let mut dispatcher = newsletters();
    let log = Transcript::new();
    let before = Recorder::new("before", &log);
    let broken = Recorder::failing("broken", &log);
    let after = Recorder::new("after", &log);
    dispatcher.register("Tech", before.clone()).unwrap();
    dispatcher.register("Tech", broken.clone()).unwrap();
    dispatcher.register("Tech", after.clone()).unwrap();

    let report = dispatcher.dispatch("Tech", "update").unwrap();

    assert_eq!(report.delivered, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(&report.failures[0].subscriber, broken.id());
    assert_eq!(report.failures[0].name, "broken");
    assert!(matches!(report.failures[0].error, DeliveryError::Rejected(_)));
    assert_eq!(after.calls(), 1);
}

#[test]
fn test_add_newsletter_is_idempotent() {
    let mut dispatcher = newsletters();
    let log = Transcript::new();
    let tom = Recorder::new("Tom", &log);
    dispatcher.register("Tech", tom.clone()).unwrap();

    assert!(!dispatcher.add_newsletter("Tech"));
    assert!(dispatcher.get_subscriptions("Tech").unwrap().contains(tom.id()));

    assert!(!dispatcher.has_newsletter("Videogames"));
    assert!(dispatcher.add_newsletter("Videogames"));
    assert!(dispatcher.has_newsletter("Videogames"));
}

#[test]
fn test_cleanup_subscriber_removes_every_registration() {
    let mut dispatcher = newsletters();
    let log = Transcript::new();
    let tom = Recorder::new("Tom", &log);
    let sara = Recorder::new("Sara", &log);
    dispatcher.register("Tech", tom.clone()).unwrap();
    dispatcher.register("Travel", tom.clone()).unwrap();
    dispatcher.register("Travel", sara.clone()).unwrap();

    assert_eq!(dispatcher.cleanup_subscriber(tom.id()), 2);

    assert!(dispatcher.get_subscriptions("Tech").unwrap().is_empty());
    assert_eq!(dispatcher.get_subscriptions("Travel").unwrap().ids(), vec![sara.id().clone()]);
    assert_eq!(dispatcher.cleanup_subscriber(tom.id()), 0);
}

#[test]
fn test_subscriptions_are_a_snapshot() {
    let mut dispatcher = newsletters();
    let log = Transcript::new();
    let tom = Recorder::new("Tom", &log);
    let before = dispatcher.get_subscriptions("Tech").unwrap();

    dispatcher.register("Tech", tom).unwrap();

    assert!(before.is_empty());
    assert_eq!(dispatcher.get_subscriptions("Tech").unwrap().names(), vec!["Tom"]);
}

#[test]
fn test_shared_dispatcher_basic_operations() {
    let shared = SharedDispatcher::new(["Tech"]);
    let log = Transcript::new();
    let tom = Recorder::new("Tom", &log);

    shared.register("Tech", tom.clone()).unwrap();
    let report = shared.dispatch("Tech", "hi").unwrap();
    assert_eq!(report.delivered, 1);

    assert_eq!(shared.unregister("Tech", tom.id()), Ok(true));
    assert!(shared.get_subscriptions("Tech").unwrap().is_empty());
    assert_eq!(
        shared.dispatch("Travel", "hi").unwrap_err(),
        DispatchError::TopicNotFound("Travel".to_string())
    );
    assert!(shared.add_newsletter("Travel"));
    assert_eq!(shared.newsletters(), vec!["Tech", "Travel"]);
}

/// Registers another subscriber on the same handle from inside `receive`.
struct Recruiter {
    id: SubscriberId,
    dispatcher: SharedDispatcher,
    recruit: Arc<Recorder>,
}

impl Receive for Recruiter {
    fn id(&self) -> &SubscriberId {
        &self.id
    }

    fn name(&self) -> &str {
        "recruiter"
    }

    fn receive(&self, message: &Message) -> Result<(), DeliveryError> {
        self.dispatcher
            .register(&message.topic, self.recruit.clone())
            .map_err(|e| DeliveryError::Rejected(e.to_string()))
    }
}

#[test]
fn test_shared_dispatch_runs_subscribers_unlocked() {
    let shared = SharedDispatcher::new(["Tech"]);
    let log = Transcript::new();
    let recruit = Recorder::new("recruit", &log);
    let recruiter = Arc::new(Recruiter {
        id: SubscriberId::generate(),
        dispatcher: shared.clone(),
        recruit: recruit.clone(),
    });
    shared.register("Tech", recruiter).unwrap();

    let report = shared.dispatch("Tech", "first").unwrap();

    // the recruit joined during delivery, after the snapshot was taken
    assert!(report.is_clean());
    assert_eq!(recruit.calls(), 0);
    assert_eq!(shared.get_subscriptions("Tech").unwrap().len(), 2);

    shared.dispatch("Tech", "second").unwrap();
    assert_eq!(recruit.calls(), 1);
}

#[test]
fn test_shared_dispatcher_across_threads() {
    let shared = SharedDispatcher::new(["Tech"]);
    let log = Transcript::new();
    let subscribers: Vec<Arc<Recorder>> = (0..8)
        .map(|i| Recorder::new(&format!("s{i}"), &log))
        .collect();

    thread::scope(|scope| {
        for sub in &subscribers {
            let shared = shared.clone();
            let sub = sub.clone();
            scope.spawn(move || {
                shared.register("Tech", sub).unwrap();
                shared.dispatch("Tech", "tick").unwrap();
            });
        }
    });

    assert_eq!(shared.get_subscriptions("Tech").unwrap().len(), 8);

    let before: Vec<usize> = subscribers.iter().map(|s| s.calls()).collect();
    shared.dispatch("Tech", "final").unwrap();
    for (sub, calls) in subscribers.iter().zip(before) {
        assert_eq!(sub.calls(), calls + 1);
    }
}

#[test]
fn test_write_failure_does_not_stop_fanout() {
    struct ClosedPipe;
    impl std::io::Write for ClosedPipe {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::from(std::io::ErrorKind::BrokenPipe))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    let mut dispatcher = newsletters();
    let log = Transcript::new();
    let first = Recorder::new("first", &log);
    let piped = Arc::new(Subscriber::with_writer("piped", ClosedPipe));
    let last = Arc::new(Subscriber::with_transcript("last", log.clone()));
    dispatcher.register("Tech", first.clone()).unwrap();
    dispatcher.register("Tech", piped.clone()).unwrap();
    dispatcher.register("Tech", last.clone()).unwrap();

    let report = dispatcher.dispatch("Tech", "update").unwrap();

    assert_eq!(report.delivered, 2);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(&report.failures[0].subscriber, piped.id());
    assert!(matches!(report.failures[0].error, DeliveryError::Io(_)));
    assert_eq!(log.lines(), vec!["first:update", "last received: update"]);
}

#[test]
fn test_subscriptions_iterate_in_registration_order() {
    let mut dispatcher = newsletters();
    let log = Transcript::new();
    let tom = Recorder::new("Tom", &log);
    let sara = Recorder::new("Sara", &log);
    dispatcher.register("Travel", tom.clone()).unwrap();
    dispatcher.register("Travel", sara.clone()).unwrap();

    let subs = dispatcher.get_subscriptions("Travel").unwrap();
    let ids: Vec<&SubscriberId> = subs.iter().map(|s| s.id()).collect();

    assert_eq!(ids, vec![tom.id(), sara.id()]);
}

#[test]
fn test_shared_dispatcher_cleanup_and_topic_lookup() {
    let shared = SharedDispatcher::new(["Tech", "Travel"]);
    let log = Transcript::new();
    let tom = Recorder::new("Tom", &log);
    let sara = Recorder::new("Sara", &log);
    shared.register("Tech", tom.clone()).unwrap();
    shared.register("Travel", tom.clone()).unwrap();
    shared.register("Travel", sara.clone()).unwrap();

    assert_eq!(shared.cleanup_subscriber(tom.id()), 2);
    assert!(shared.get_subscriptions("Tech").unwrap().is_empty());
    assert_eq!(
        shared.get_subscriptions("Travel").unwrap().ids(),
        vec![sara.id().clone()]
    );
    assert_eq!(shared.cleanup_subscriber(tom.id()), 0);

    assert!(!shared.has_newsletter("Videogames"));
    assert!(shared.add_newsletter("Videogames"));
    assert!(shared.has_newsletter("Videogames"));
    assert!(!shared.add_newsletter("Videogames"));
}
