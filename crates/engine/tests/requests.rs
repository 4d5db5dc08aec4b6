mod common;

use engine::{
    EngineError, ProviderService, RequestCmd, RequestFilter, RequestKind, RequestStatus,
    SYSTEM_RESOLVER,
};

use common::{admin, balance, customer, engine_with_db, fund};

#[tokio::test]
async fn renewal_is_blocked_when_balance_below_total() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    fund(&engine, &admin, &ali, 3299).await;

    // 3000 + 10% commission = 3300
    let cmd = RequestCmd::renewal(ali.id, ProviderService::YemenMobile, "771234567", 3000);
    let err = engine.submit_request(cmd.clone()).await.unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientFunds("balance 3,299 YER, required 3,300 YER".to_string())
    );
    assert_eq!(balance(&engine, &ali).await, 3299);
    assert!(
        engine
            .list_requests_for_user(ali.id, Some(RequestStatus::Pending))
            .await
            .unwrap()
            .is_empty()
    );

    fund(&engine, &admin, &ali, 1).await;
    let request = engine.submit_request(cmd).await.unwrap();
    assert_eq!(request.status, RequestStatus::Pending);
    assert_eq!(request.fee, 300);
    assert_eq!(request.debited, 3300);
    assert_eq!(balance(&engine, &ali).await, 0);
}

#[tokio::test]
async fn renewal_number_must_match_operator() {
    let (engine, _db) = engine_with_db().await;
    let ali = customer(&engine, "Ali", "771234567").await;

    let err = engine
        .submit_request(RequestCmd::renewal(
            ali.id,
            ProviderService::Baity,
            "771234567",
            1000,
        ))
        .await
        .unwrap_err();
    assert_eq!(
        err,
        EngineError::InvalidPhone("771234567 must start with 79".to_string())
    );
}

#[tokio::test]
async fn rejected_withdrawal_refunds_exactly_once() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    fund(&engine, &admin, &ali, 10_000).await;

    let request = engine
        .submit_request(RequestCmd::withdrawal(ali.id, 5000).target("Sana'a branch"))
        .await
        .unwrap();
    // 2% withdrawal fee
    assert_eq!(request.debited, 5100);
    assert_eq!(balance(&engine, &ali).await, 4900);

    let rejected = engine
        .reject_request(request.id, admin.id, Some("agent closed"))
        .await
        .unwrap();
    assert_eq!(rejected.status, RequestStatus::Rejected);
    assert_eq!(rejected.resolved_by, Some(admin.id.to_string()));
    assert_eq!(rejected.resolution_note.as_deref(), Some("agent closed"));
    assert_eq!(balance(&engine, &ali).await, 10_000);

    for second in [
        engine.reject_request(request.id, admin.id, None).await,
        engine.approve_request(request.id, admin.id, None).await,
    ] {
        assert!(matches!(second, Err(EngineError::InvalidTransition(_))));
    }
    assert_eq!(balance(&engine, &ali).await, 10_000);

    let records = engine.request_transactions(request.id).await.unwrap();
    let kinds: Vec<_> = records.iter().map(|t| t.transaction_type.as_str()).collect();
    assert_eq!(kinds, ["withdrawal", "refund"]);
    assert_eq!(records.iter().map(|t| t.amount).sum::<i64>(), 0);
}

#[tokio::test]
async fn approved_transfer_credits_recipient() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    let sara = customer(&engine, "Sara", "711234567").await;
    fund(&engine, &admin, &ali, 5000).await;

    let request = engine
        .submit_request(RequestCmd::transfer(ali.id, "+967711234567", 2000))
        .await
        .unwrap();
    assert_eq!(request.target.as_deref(), Some("711234567"));
    assert_eq!(request.debited, 2020);
    assert_eq!(balance(&engine, &sara).await, 0);

    engine
        .approve_request(request.id, admin.id, None)
        .await
        .unwrap();
    assert_eq!(balance(&engine, &ali).await, 2980);
    assert_eq!(balance(&engine, &sara).await, 2000);

    let records = engine.request_transactions(request.id).await.unwrap();
    let kinds: Vec<_> = records.iter().map(|t| t.transaction_type.as_str()).collect();
    assert!(kinds.contains(&"transfer_out"));
    assert!(kinds.contains(&"transfer_in"));
    assert!(kinds.contains(&"transfer_approved"));
    // the fee is the only money leaving the system
    assert_eq!(records.iter().map(|t| t.amount).sum::<i64>(), -20);
}

#[tokio::test]
async fn rejected_transfer_refunds_debit() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    customer(&engine, "Sara", "711234567").await;
    fund(&engine, &admin, &ali, 5000).await;

    let request = engine
        .submit_request(RequestCmd::transfer(ali.id, "711234567", 2000))
        .await
        .unwrap();
    engine
        .reject_request(request.id, admin.id, None)
        .await
        .unwrap();
    assert_eq!(balance(&engine, &ali).await, 5000);
}

#[tokio::test]
async fn transfer_request_validates_recipient() {
    let (engine, _db) = engine_with_db().await;
    let ali = customer(&engine, "Ali", "771234567").await;

    assert!(matches!(
        engine
            .submit_request(RequestCmd::new(RequestKind::Transfer, ali.id, 100))
            .await,
        Err(EngineError::InvalidPhone(_))
    ));
    assert!(matches!(
        engine
            .submit_request(RequestCmd::transfer(ali.id, "711234567", 100))
            .await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(matches!(
        engine
            .submit_request(RequestCmd::transfer(ali.id, "771234567", 100))
            .await,
        Err(EngineError::InvalidPhone(_))
    ));
    assert!(matches!(
        engine.submit_request(RequestCmd::withdrawal(ali.id, 0)).await,
        Err(EngineError::InvalidAmount(_))
    ));
}

#[tokio::test]
async fn rejected_deposit_moves_nothing() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;

    let request = engine
        .submit_request(RequestCmd::deposit(ali.id, 7000))
        .await
        .unwrap();
    assert_eq!(request.debited, 0);
    engine
        .reject_request(request.id, admin.id, Some("no receipt"))
        .await
        .unwrap();
    assert_eq!(balance(&engine, &ali).await, 0);
    assert!(engine.request_transactions(request.id).await.unwrap().is_empty());

    let notes = engine.list_notifications(ali.id, true).await.unwrap();
    assert_eq!(notes[0].title, "Request rejected");
    assert!(notes[0].body.ends_with("no receipt"));
}

#[tokio::test]
async fn only_admins_resolve() {
    let (engine, _db) = engine_with_db().await;
    let ali = customer(&engine, "Ali", "771234567").await;
    let request = engine
        .submit_request(RequestCmd::deposit(ali.id, 7000))
        .await
        .unwrap();

    assert!(matches!(
        engine.approve_request(request.id, ali.id, None).await,
        Err(EngineError::Forbidden(_))
    ));
    assert!(matches!(
        engine.list_requests(ali.id, &RequestFilter::pending()).await,
        Err(EngineError::Forbidden(_))
    ));
    assert_ne!(request.resolved_by.as_deref(), Some(SYSTEM_RESOLVER));
}

#[tokio::test]
async fn queue_filters_by_status_and_kind() {
    let (engine, _db) = engine_with_db().await;
    let admin = admin(&engine).await;
    let ali = customer(&engine, "Ali", "771234567").await;
    let sara = customer(&engine, "Sara", "711234567").await;
    fund(&engine, &admin, &ali, 10_000).await;

    engine
        .submit_request(RequestCmd::withdrawal(ali.id, 1000))
        .await
        .unwrap();
    let last = engine
        .submit_request(RequestCmd::deposit(sara.id, 500))
        .await
        .unwrap();

    let pending = engine
        .list_requests(admin.id, &RequestFilter::pending())
        .await
        .unwrap();
    assert_eq!(pending.len(), 2);
    assert_eq!(pending[0].id, last.id);

    let deposits = engine
        .list_requests(
            admin.id,
            &RequestFilter {
                kind: Some(RequestKind::Deposit),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    // the funding deposit (approved) and Sara's
    assert_eq!(deposits.len(), 2);

    // requesters see their own requests, others don't
    assert_eq!(engine.request(last.id, sara.id).await.unwrap().id, last.id);
    assert!(matches!(
        engine.request(last.id, ali.id).await,
        Err(EngineError::KeyNotFound(_))
    ));
    assert!(engine.request(last.id, admin.id).await.is_ok());
}
