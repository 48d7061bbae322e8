use std::sync::Arc;

use chrono::Duration;
use quiz_core::model::{
    FeedbackTier, Identity, ItemError, ItemId, PoolSelector, QuizKind, QuizResult, ResultCategory,
};
use quiz_core::time::{fixed_clock, fixed_now};
use services::{
    Anonymous, LibraryError, LibraryService, ResultsError, ResultsService, SignedInIdentity,
    StaticIdentity,
};
use storage::repository::{InMemoryRepository, ResultRepository, StorageError};

fn me() -> Identity {
    Identity::new("me").unwrap()
}

fn result(kind: QuizKind, score: u32, minutes: i64) -> QuizResult {
    QuizResult::from_persisted(
        kind,
        PoolSelector::General,
        score,
        100,
        FeedbackTier::Good,
        fixed_now() + Duration::minutes(minutes),
    )
    .unwrap()
}

#[tokio::test]
async fn library_add_list_delete() {
    let repo = InMemoryRepository::new();
    let provider = Arc::new(StaticIdentity::new(me()));
    let earlier = LibraryService::new(fixed_clock(), Arc::new(repo.clone()), provider.clone());
    let later = LibraryService::new(
        fixed_clock().advanced_by(Duration::minutes(5)),
        Arc::new(repo.clone()),
        provider,
    );

    let kedi = earlier.add_item("kedi", "photos/kedi.jpg").await.unwrap();
    let elma = later.add_item("  elma ", "photos/elma.jpg").await.unwrap();
    assert_eq!(elma.item.label().as_str(), "elma");
    assert_eq!(kedi.recognized_at, fixed_now());

    let listed = earlier.list_items().await.unwrap();
    let labels: Vec<_> = listed.iter().map(|e| e.item.label().as_str()).collect();
    assert_eq!(labels, ["elma", "kedi"]);

    earlier.delete_item(kedi.id).await.unwrap();
    assert_eq!(earlier.list_items().await.unwrap(), vec![elma]);

    let err = earlier.delete_item(kedi.id).await.unwrap_err();
    assert!(matches!(err, LibraryError::Storage(StorageError::NotFound)));
    let err = earlier.delete_item(ItemId::new(404)).await.unwrap_err();
    assert!(matches!(err, LibraryError::Storage(StorageError::NotFound)));
}

#[tokio::test]
async fn library_validates_input_and_identity() {
    let repo = InMemoryRepository::new();
    let library = LibraryService::new(
        fixed_clock(),
        Arc::new(repo.clone()),
        Arc::new(StaticIdentity::new(me())),
    );
    let err = library.add_item(" ", "p.jpg").await.unwrap_err();
    assert!(matches!(err, LibraryError::Item(ItemError::EmptyLabel)));
    let err = library.add_item("kedi", "").await.unwrap_err();
    assert!(matches!(err, LibraryError::Item(ItemError::MissingImage)));

    let anonymous = LibraryService::new(fixed_clock(), Arc::new(repo), Arc::new(Anonymous));
    let err = anonymous.list_items().await.unwrap_err();
    assert!(matches!(err, LibraryError::MissingIdentity));
}

#[tokio::test]
async fn libraries_follow_the_signed_in_identity() {
    let repo = InMemoryRepository::new();
    let provider = Arc::new(SignedInIdentity::new());
    let library = LibraryService::new(fixed_clock(), Arc::new(repo), provider.clone());

    provider.sign_in(Identity::new("alice").unwrap());
    library.add_item("kitap", "k.jpg").await.unwrap();

    provider.sign_in(Identity::new("bob").unwrap());
    assert!(library.list_items().await.unwrap().is_empty());

    provider.sign_out();
    assert!(matches!(
        library.list_items().await.unwrap_err(),
        LibraryError::MissingIdentity
    ));
}

#[tokio::test]
async fn history_and_stats() {
    let repo = InMemoryRepository::new();
    for (kind, score, minutes) in [
        (QuizKind::TextChoice, 40, 0),
        (QuizKind::TextChoice, 80, 10),
        (QuizKind::AudioGuess, 50, 20),
    ] {
        repo.append_result(&me(), &result(kind, score, minutes))
            .await
            .unwrap();
    }
    let results = ResultsService::new(Arc::new(repo), Arc::new(StaticIdentity::new(me())));

    let history = results.history(None, 2).await.unwrap();
    let scores: Vec<_> = history.iter().map(|r| r.result.score()).collect();
    assert_eq!(scores, [50, 80]);

    let stats = results.stats(None).await.unwrap();
    assert_eq!(stats.len(), 2);
    assert_eq!(stats[0].kind, QuizKind::TextChoice);
    assert_eq!(stats[0].attempts, 2);
    assert_eq!(stats[0].best_score, 80);
    assert_eq!(stats[0].average_percent, 60);
    assert_eq!(stats[0].last_completed_at, fixed_now() + Duration::minutes(10));
    assert_eq!(stats[1].kind, QuizKind::AudioGuess);

    let games = results.stats(Some(ResultCategory::Game)).await.unwrap();
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].kind, QuizKind::AudioGuess);

    let anonymous = ResultsService::new(Arc::new(InMemoryRepository::new()), Arc::new(Anonymous));
    assert!(matches!(
        anonymous.history(None, 5).await.unwrap_err(),
        ResultsError::MissingIdentity
    ));
}
