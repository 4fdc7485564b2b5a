use super::*;
use std::sync::mpsc;
use std::time::Duration;

fn runtime() -> tokio::runtime::Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap()
}

#[test]
fn every_observer_sees_every_value_in_order() {
    let rt = runtime();
    let subject = Subject::new(rt.handle());
    let (tx_a, rx_a) = mpsc::channel();
    let (tx_b, rx_b) = mpsc::channel();
    subject.subscribe(move |v: &u32| {
        let _ = tx_a.send(*v);
    });
    subject.subscribe(move |v: &u32| {
        let _ = tx_b.send(*v);
    });

    for v in 0..10 {
        assert!(subject.publish(v));
    }

    for v in 0..10 {
        assert_eq!(rx_a.recv_timeout(Duration::from_secs(2)).unwrap(), v);
        assert_eq!(rx_b.recv_timeout(Duration::from_secs(2)).unwrap(), v);
    }
}

#[test]
fn unsubscribe_reports_whether_observer_existed() {
    let rt = runtime();
    let subject: Subject<u32> = Subject::new(rt.handle());
    let id = subject.subscribe(|_| {});
    assert_eq!(subject.observer_count(), 1);
    assert!(subject.unsubscribe(id));
    assert!(!subject.unsubscribe(id));
    assert_eq!(subject.observer_count(), 0);
}

#[test]
fn observer_may_subscribe_during_delivery() {
    let rt = runtime();
    let subject: Subject<u32> = Subject::new(rt.handle());
    let (tx, rx) = mpsc::channel();
    let inner = subject.clone();
    subject.subscribe(move |v| {
        if *v == 0 {
            let tx = tx.clone();
            inner.subscribe(move |v| {
                let _ = tx.send(*v);
            });
        }
    });

    subject.publish(0);
    subject.publish(1);

    assert_eq!(rx.recv_timeout(Duration::from_secs(2)).unwrap(), 1);
}
