mod utils;

use campus_repo::transaction_repo::{TransactionRepo, TransactionRepoError};
use campus_repo::user_repo::{User, UserRepo};
use chrono::Utc;
use rstest::rstest;
use std::sync::Arc;
use utils::generator::{generate_new_transaction, generate_new_user_with_balance};
use utils::RepoType;

async fn create_user(user_repo: &Arc<dyn UserRepo>, balance: i64) -> User {
    user_repo
        .create_user(generate_new_user_with_balance(balance))
        .await
        .unwrap()
}

async fn balance_of(user_repo: &Arc<dyn UserRepo>, user: &User) -> i64 {
    user_repo.get_user(user.id).await.unwrap().balance
}

async fn setup(
    repo_type: RepoType,
) -> (Arc<dyn UserRepo>, Arc<dyn TransactionRepo>, User, User) {
    let (user_repo, transaction_repo) = utils::build_payment_repos(repo_type).await;
    let alice = create_user(&user_repo, 100).await;
    let bob = create_user(&user_repo, 0).await;
    (user_repo, transaction_repo, alice, bob)
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_pending_transaction(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;

    let new_transaction = generate_new_transaction(alice.id, bob.id, 40, None);
    let transaction = transaction_repo
        .create_transaction(new_transaction.clone())
        .await
        .unwrap();
    assert_eq!(transaction.sender_id, alice.id);
    assert_eq!(transaction.receiver_id, bob.id);
    assert_eq!(transaction.amount, 40);
    assert_eq!(transaction.message, new_transaction.message);
    assert_eq!(transaction.accepted, None);

    let stored_transaction = transaction_repo
        .get_transaction(transaction.id)
        .await
        .unwrap();
    assert_eq!(stored_transaction, transaction);

    assert_eq!(balance_of(&user_repo, &alice).await, 100);
    assert_eq!(balance_of(&user_repo, &bob).await, 0);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_rejected_transaction(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;

    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, bob.id, 40, Some(false)))
        .await
        .unwrap();
    assert_eq!(transaction.accepted, Some(false));

    assert_eq!(balance_of(&user_repo, &alice).await, 100);
    assert_eq!(balance_of(&user_repo, &bob).await, 0);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_accepted_transaction(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;

    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, bob.id, 40, Some(true)))
        .await
        .unwrap();
    assert_eq!(transaction.accepted, Some(true));

    assert_eq!(balance_of(&user_repo, &alice).await, 60);
    assert_eq!(balance_of(&user_repo, &bob).await, 40);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_create_accepted_transaction_insufficient_funds(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;

    let result = transaction_repo
        .create_transaction(generate_new_transaction(bob.id, alice.id, 50, Some(true)))
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::InsufficientFunds {
            balance: 0,
            amount: 50,
            ..
        })
    ));

    assert!(transaction_repo
        .get_all_transactions()
        .await
        .unwrap()
        .is_empty());
    assert_eq!(balance_of(&user_repo, &alice).await, 100);
    assert_eq!(balance_of(&user_repo, &bob).await, 0);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_accept_transaction(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;
    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, bob.id, 40, None))
        .await
        .unwrap();

    let resolved = transaction_repo
        .resolve_transaction(transaction.id, true, Utc::now())
        .await
        .unwrap();
    assert_eq!(resolved.id, transaction.id);
    assert_eq!(resolved.accepted, Some(true));
    assert!(resolved.timestamp >= transaction.timestamp);
    assert_eq!(resolved.amount, transaction.amount);

    assert_eq!(balance_of(&user_repo, &alice).await, 60);
    assert_eq!(balance_of(&user_repo, &bob).await, 40);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_reject_transaction(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;
    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, bob.id, 40, None))
        .await
        .unwrap();

    let resolved = transaction_repo
        .resolve_transaction(transaction.id, false, Utc::now())
        .await
        .unwrap();
    assert_eq!(resolved.accepted, Some(false));

    assert_eq!(balance_of(&user_repo, &alice).await, 100);
    assert_eq!(balance_of(&user_repo, &bob).await, 0);
}

#[rstest]
#[case::sqlx(RepoType::SQLx, true, true)]
#[case::sqlx(RepoType::SQLx, true, false)]
#[case::sqlx(RepoType::SQLx, false, true)]
#[case::sqlx(RepoType::SQLx, false, false)]
#[case::mem(RepoType::Mem, true, true)]
#[case::mem(RepoType::Mem, true, false)]
#[case::mem(RepoType::Mem, false, true)]
#[case::mem(RepoType::Mem, false, false)]
#[actix_rt::test]
async fn test_resolve_transaction_twice(
    #[case] repo_type: RepoType,
    #[case] first: bool,
    #[case] second: bool,
) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;
    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, bob.id, 10, None))
        .await
        .unwrap();
    transaction_repo
        .resolve_transaction(transaction.id, first, Utc::now())
        .await
        .unwrap();
    let balance_after_first = balance_of(&user_repo, &alice).await;

    let result = transaction_repo
        .resolve_transaction(transaction.id, second, Utc::now())
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::AlreadyResolved(id)) if id == transaction.id
    ));

    let stored_transaction = transaction_repo
        .get_transaction(transaction.id)
        .await
        .unwrap();
    assert_eq!(stored_transaction.accepted, Some(first));
    assert_eq!(balance_of(&user_repo, &alice).await, balance_after_first);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_accept_transaction_insufficient_funds(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;
    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(bob.id, alice.id, 25, None))
        .await
        .unwrap();

    let result = transaction_repo
        .resolve_transaction(transaction.id, true, Utc::now())
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::InsufficientFunds { .. })
    ));

    let stored_transaction = transaction_repo
        .get_transaction(transaction.id)
        .await
        .unwrap();
    assert_eq!(stored_transaction, transaction);
    assert_eq!(balance_of(&user_repo, &alice).await, 100);
    assert_eq!(balance_of(&user_repo, &bob).await, 0);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_resolve_invalid_transaction(#[case] repo_type: RepoType) {
    let (_user_repo, transaction_repo, _alice, _bob) = setup(repo_type).await;

    let result = transaction_repo
        .resolve_transaction(1234, true, Utc::now())
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::TransactionNotFound(1234))
    ));
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_get_user_transactions(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;
    let carol = create_user(&user_repo, 30).await;

    let received = transaction_repo
        .create_transaction(generate_new_transaction(carol.id, alice.id, 5, None))
        .await
        .unwrap();
    let sent = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, bob.id, 7, None))
        .await
        .unwrap();
    let to_self = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, alice.id, 1, None))
        .await
        .unwrap();
    let unrelated = transaction_repo
        .create_transaction(generate_new_transaction(bob.id, carol.id, 0, None))
        .await
        .unwrap();

    let transactions = transaction_repo
        .get_user_transactions(alice.id)
        .await
        .unwrap();
    assert_eq!(transactions, vec![sent.clone(), to_self.clone(), received.clone()]);

    let carol_transactions = transaction_repo
        .get_user_transactions(carol.id)
        .await
        .unwrap();
    assert_eq!(carol_transactions, vec![received.clone(), unrelated]);

    user_repo.delete_user(alice.id).await.unwrap();
    let transactions = transaction_repo
        .get_user_transactions(alice.id)
        .await
        .unwrap();
    assert_eq!(transactions, vec![sent, to_self, received]);

    let all_transactions = transaction_repo.get_all_transactions().await.unwrap();
    assert_eq!(all_transactions.len(), 4);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_transactions_survive_user_deletion(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, bob) = setup(repo_type).await;
    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, bob.id, 10, None))
        .await
        .unwrap();

    user_repo.delete_user(bob.id).await.unwrap();

    let transactions = transaction_repo
        .get_user_transactions(bob.id)
        .await
        .unwrap();
    assert_eq!(transactions, vec![transaction.clone()]);

    let result = transaction_repo
        .resolve_transaction(transaction.id, true, Utc::now())
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::UserNotFound(id)) if id == bob.id
    ));
    assert_eq!(balance_of(&user_repo, &alice).await, 100);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_self_transfer(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, _bob) = setup(repo_type).await;

    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, alice.id, 100, Some(true)))
        .await
        .unwrap();
    assert_eq!(transaction.accepted, Some(true));
    assert_eq!(balance_of(&user_repo, &alice).await, 100);
}

#[rstest]
#[case::sqlx(RepoType::SQLx)]
#[case::mem(RepoType::Mem)]
#[actix_rt::test]
async fn test_transfer_overflowing_receiver_balance(#[case] repo_type: RepoType) {
    let (user_repo, transaction_repo, alice, _bob) = setup(repo_type).await;
    let whale = create_user(&user_repo, i64::MAX - 10).await;

    let result = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, whale.id, 50, Some(true)))
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::BalanceOverflow { user_id, amount: 50 }) if user_id == whale.id
    ));
    assert!(transaction_repo
        .get_all_transactions()
        .await
        .unwrap()
        .is_empty());

    let pending = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, whale.id, 50, None))
        .await
        .unwrap();
    let result = transaction_repo
        .resolve_transaction(pending.id, true, Utc::now())
        .await;
    assert!(matches!(
        result,
        Err(TransactionRepoError::BalanceOverflow { user_id, .. }) if user_id == whale.id
    ));

    let stored_transaction = transaction_repo.get_transaction(pending.id).await.unwrap();
    assert_eq!(stored_transaction, pending);
    assert_eq!(balance_of(&user_repo, &alice).await, 100);
    assert_eq!(balance_of(&user_repo, &whale).await, i64::MAX - 10);

    // a smaller transfer that still fits goes through
    let transaction = transaction_repo
        .create_transaction(generate_new_transaction(alice.id, whale.id, 10, Some(true)))
        .await
        .unwrap();
    assert_eq!(transaction.accepted, Some(true));
    assert_eq!(balance_of(&user_repo, &whale).await, i64::MAX);
    assert_eq!(balance_of(&user_repo, &alice).await, 90);
}
