//! Queue position invariants over a real SQLite file.

mod common;

use std::sync::Arc;

use common::{assert_dense, queue_request, Harness};
use qprint_core::port::PrintJobRepository;

#[tokio::test]
async fn test_enqueue_assigns_consecutive_positions() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;

    for expected in 1..=4 {
        let job = h.upload_queued(&customer, &shop).await;
        assert_eq!(job.queue_position, Some(expected));
    }
    assert_dense(&h.positions(&shop).await);
}

#[tokio::test]
async fn test_confirm_closes_gap() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;

    let mut ids = Vec::new();
    for _ in 0..5 {
        ids.push(h.upload_queued(&customer, &shop).await.id);
    }

    // Confirm positions 2 and 4 (in that order)
    h.lifecycle.confirm_queue(&shop, ids[1]).await.unwrap();
    h.lifecycle.confirm_queue(&shop, ids[3]).await.unwrap();

    let positions = h.positions(&shop).await;
    assert_dense(&positions);
    let remaining: Vec<i64> = positions.iter().map(|(id, _)| *id).collect();
    assert_eq!(remaining, vec![ids[0], ids[2], ids[4]]);

    let confirmed = h.jobs.find_by_id(ids[1]).await.unwrap().unwrap();
    assert_eq!(confirmed.queue_position, None);
    assert!(confirmed.is_confirmed());
}

#[tokio::test]
async fn test_drained_queue_restarts_at_one() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;

    let first = h.upload_queued(&customer, &shop).await;
    let second = h.upload_queued(&customer, &shop).await;
    h.lifecycle.confirm_queue(&shop, first.id).await.unwrap();
    h.lifecycle.confirm_queue(&shop, second.id).await.unwrap();
    assert!(h.positions(&shop).await.is_empty());

    let next = h.upload_queued(&customer, &shop).await;
    assert_eq!(next.queue_position, Some(1));
}

#[tokio::test]
async fn test_queues_are_per_shop() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop_a = h.shop("shop-a", 0.0, 0.0).await;
    let shop_b = h.shop("shop-b", 0.0, 1.0).await;

    let mut a_ids = Vec::new();
    for _ in 0..3 {
        a_ids.push(h.upload_queued(&customer, &shop_a).await.id);
        h.upload_queued(&customer, &shop_b).await;
    }
    let before_b = h.positions(&shop_b).await;

    h.lifecycle.confirm_queue(&shop_a, a_ids[0]).await.unwrap();

    assert_dense(&h.positions(&shop_a).await);
    assert_eq!(h.positions(&shop_a).await.len(), 2);
    assert_eq!(h.positions(&shop_b).await, before_b);
}

#[tokio::test]
async fn test_private_jobs_take_no_position() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;

    let private = h.upload_private(&customer).await;
    let queued = h.upload_queued(&customer, &shop).await;

    assert_eq!(private.queue_position, None);
    assert_eq!(queued.queue_position, Some(1));
}

#[tokio::test]
async fn test_concurrent_enqueue_stays_dense() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;

    let mut handles = Vec::new();
    for _ in 0..20 {
        let uploads = Arc::clone(&h.uploads);
        let req = queue_request(&shop);
        handles.push(tokio::spawn(
            async move { uploads.upload(&customer, req).await },
        ));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let positions = h.positions(&shop).await;
    assert_eq!(positions.len(), 20);
    assert_dense(&positions);
}

#[tokio::test]
async fn test_concurrent_confirms_stay_dense() {
    let h = Harness::new().await;
    let customer = h.customer("alice").await;
    let shop = h.shop("corner-print", 12.97, 77.59).await;

    let mut ids = Vec::new();
    for _ in 0..10 {
        ids.push(h.upload_queued(&customer, &shop).await.id);
    }

    let mut handles = Vec::new();
    for id in ids.iter().step_by(2).copied() {
        let lifecycle = Arc::clone(&h.lifecycle);
        handles.push(tokio::spawn(
            async move { lifecycle.confirm_queue(&shop, id).await },
        ));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let positions = h.positions(&shop).await;
    assert_eq!(positions.len(), 5);
    assert_dense(&positions);
}
