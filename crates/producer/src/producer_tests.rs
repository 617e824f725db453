use super::*;
use crate::test_support::RecordingClient;
use std::time::{Duration, Instant};

#[test]
fn small_payloads_flush_together_after_the_window() {
    let (client, calls) = RecordingClient::new();
    let config = ProducerConfig::new("clicks").with_buffer_time(Duration::from_millis(200));
    let producer = Producer::new(config, client).expect("start producer");

    let submitted = Instant::now();
    for i in 0u8..3 {
        producer.submit(vec![i; 10]).unwrap();
    }

    let call = calls
        .recv_timeout(Duration::from_secs(2))
        .expect("flush within window");
    assert_eq!(call.stream_name, "clicks");
    assert_eq!(call.records.len(), 3);
    assert!(
        call.at.duration_since(submitted) < Duration::from_millis(600),
        "flush took {:?}",
        call.at.duration_since(submitted)
    );

    assert!(calls.recv_timeout(Duration::from_millis(300)).is_err());
    producer.shutdown().unwrap();
    assert_eq!(producer.stats().records_submitted, 3);
}

#[test]
fn two_large_records_go_out_in_separate_batches() {
    let (client, calls) = RecordingClient::new();
    let max = 10_000;
    let config = ProducerConfig::new("s")
        .with_buffer_time(Duration::from_secs(5))
        .with_max_batch_size(max);
    let producer = Producer::new(config, client).unwrap();

    producer.submit(vec![1; max * 6 / 10]).unwrap();
    producer.submit(vec![2; max * 6 / 10]).unwrap();

    // The second record cuts the first batch before the 5s window ends.
    let first = calls.recv_timeout(Duration::from_secs(2)).expect("early cut");
    assert_eq!(first.records.len(), 1);
    assert_eq!(first.records[0].data[0], 1);

    producer.shutdown().unwrap();
    let second = calls.try_recv().expect("carry-over flushed on shutdown");
    assert_eq!(second.records.len(), 1);
    assert_eq!(second.records[0].data[0], 2);
}

#[test]
fn oversized_payload_is_submitted_alone() {
    let (client, calls) = RecordingClient::new();
    let config = ProducerConfig::new("s")
        .with_buffer_time(Duration::from_millis(100))
        .with_max_batch_size(1024);
    let producer = Producer::new(config, client).unwrap();

    producer.submit(vec![0; 1025]).unwrap();
    producer.shutdown().unwrap();

    let batches: Vec<_> = calls.try_iter().collect();
    assert_eq!(batches.len(), 1);
    assert_eq!(batches[0].records.len(), 1);
    assert_eq!(batches[0].records[0].data.len(), 1025);
}

#[test]
fn shutdown_flushes_promptly_despite_long_window() {
    let (client, calls) = RecordingClient::new();
    let config = ProducerConfig::new("s").with_buffer_time(Duration::from_secs(5));
    let producer = Producer::new(config, client).unwrap();

    producer.submit(b"only".to_vec()).unwrap();

    let started = Instant::now();
    producer.shutdown().unwrap();
    assert!(
        started.elapsed() < Duration::from_secs(1),
        "shutdown took {:?}",
        started.elapsed()
    );

    let call = calls.try_recv().expect("flushed before shutdown returned");
    assert_eq!(call.payloads(), vec![b"only".to_vec()]);
}

#[test]
fn shutdown_is_idempotent_and_rejects_later_submits() {
    let (client, _calls) = RecordingClient::new();
    let producer = Producer::new(ProducerConfig::new("s"), client).unwrap();

    producer.shutdown().unwrap();
    producer.shutdown().unwrap();
    assert!(producer.stop_requested());

    let err = producer.submit(b"late".to_vec()).unwrap_err();
    assert!(err.to_string().contains("shut down"));
    assert_eq!(producer.stats().records_accepted, 0);
}

#[test]
fn concurrent_shutdown_calls_all_wait_for_the_worker() {
    let (client, calls) = RecordingClient::new();
    let producer = Arc::new(Producer::new(ProducerConfig::new("s"), client).unwrap());
    for i in 0u8..20 {
        producer.submit(vec![i]).unwrap();
    }

    let waiters: Vec<_> = (0..3)
        .map(|_| {
            let producer = Arc::clone(&producer);
            thread::spawn(move || producer.shutdown())
        })
        .collect();
    for w in waiters {
        w.join().unwrap().unwrap();
    }

    let delivered: usize = calls.try_iter().map(|c| c.records.len()).sum();
    assert_eq!(delivered, 20);
}

#[test]
fn drop_flushes_pending_records() {
    let (client, calls) = RecordingClient::new();
    {
        let producer = Producer::new(
            ProducerConfig::new("s").with_buffer_time(Duration::from_secs(5)),
            client,
        )
        .unwrap();
        producer.submit(b"a".to_vec()).unwrap();
        producer.submit(b"b".to_vec()).unwrap();
    }

    let call = calls.try_recv().expect("drop runs the final flush");
    assert_eq!(call.payloads(), vec![b"a".to_vec(), b"b".to_vec()]);
}

#[test]
fn every_submitted_payload_is_delivered_in_order() {
    let (client, calls) = RecordingClient::new();
    let config = ProducerConfig::new("s")
        .with_buffer_time(Duration::from_millis(50))
        .with_max_batch_size(2_000);
    let producer = Producer::new(config, client).unwrap();

    for i in 0u32..300 {
        producer.submit(i.to_be_bytes().to_vec()).unwrap();
        if i % 50 == 0 {
            thread::sleep(Duration::from_millis(20));
        }
    }
    producer.shutdown().unwrap();

    let delivered: Vec<u32> = calls
        .try_iter()
        .flat_map(|c| c.records)
        .map(|r| u32::from_be_bytes(r.data.try_into().unwrap()))
        .collect();
    assert_eq!(delivered, (0..300).collect::<Vec<_>>());

    let stats = producer.stats();
    assert_eq!(stats.records_accepted, 300);
    assert_eq!(stats.records_submitted, 300);
    assert!(stats.batches_flushed > 1);
}

#[test]
fn submissions_from_many_threads_all_arrive() {
    let (client, calls) = RecordingClient::new();
    let producer = Arc::new(
        Producer::new(
            ProducerConfig::new("s").with_buffer_time(Duration::from_millis(50)),
            client,
        )
        .unwrap(),
    );

    let writers: Vec<_> = (0..4u8)
        .map(|t| {
            let producer = Arc::clone(&producer);
            thread::spawn(move || {
                for i in 0..250u8 {
                    producer.submit(vec![t, i]).unwrap();
                }
            })
        })
        .collect();
    for w in writers {
        w.join().unwrap();
    }
    producer.shutdown().unwrap();

    let mut delivered: Vec<Vec<u8>> = calls.try_iter().flat_map(|c| c.payloads()).collect();
    delivered.sort();
    let mut expected: Vec<Vec<u8>> = (0..4u8)
        .flat_map(|t| (0..250u8).map(move |i| vec![t, i]))
        .collect();
    expected.sort();
    assert_eq!(delivered, expected);
}

#[test]
fn failed_submission_does_not_stop_delivery() {
    let (client, calls) = RecordingClient::failing_first(1);
    let producer = Producer::new(
        ProducerConfig::new("s").with_buffer_time(Duration::from_millis(50)),
        client,
    )
    .unwrap();

    producer.submit(b"dropped".to_vec()).unwrap();
    thread::sleep(Duration::from_millis(200));
    producer.submit(b"delivered".to_vec()).unwrap();
    producer.shutdown().unwrap();

    let payloads: Vec<Vec<u8>> = calls.try_iter().flat_map(|c| c.payloads()).collect();
    assert_eq!(payloads, vec![b"delivered".to_vec()]);

    let stats = producer.stats();
    assert_eq!(stats.batches_failed, 1);
    assert_eq!(stats.records_failed, 1);
}

#[test]
fn invalid_config_is_rejected_before_spawning() {
    let (client, _calls) = RecordingClient::new();
    assert!(Producer::new(ProducerConfig::new(""), client).is_err());
}

#[test]
fn termination_signal_drains_and_stops_the_worker() {
    let (client, calls) = RecordingClient::new();
    let producer = Producer::new(
        ProducerConfig::new("s").with_buffer_time(Duration::from_secs(5)),
        client,
    )
    .unwrap();
    producer.register_signal_handlers().unwrap();

    producer.submit(b"x".to_vec()).unwrap();
    signal_hook::low_level::raise(SIGTERM).unwrap();

    let call = calls
        .recv_timeout(Duration::from_secs(2))
        .expect("drained after signal");
    assert_eq!(call.payloads(), vec![b"x".to_vec()]);
    assert!(producer.stop_requested());
    assert!(producer.submit(b"late".to_vec()).is_err());

    producer.shutdown().unwrap();
}
