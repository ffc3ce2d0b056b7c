//! Integration tests for reactions and pinned messages.

mod common;

use common::{post_many, service};
use syndicate_chat::ChatError;
use syndicate_chat::state::ReactionAction;

#[tokio::test]
async fn test_double_add_counts_once() {
    let svc = service();
    let msg = svc.post_message("r1", "alice", "gm", None, None).await.unwrap();

    for _ in 0..2 {
        svc.react_to_message("r1", &msg.id, "🔥", "bob", ReactionAction::Add)
            .await
            .unwrap();
    }
    let updated = svc
        .react_to_message("r1", &msg.id, "🔥", "carol", ReactionAction::Add)
        .await
        .unwrap();

    let reactors = updated.reactions.get("🔥").unwrap();
    assert_eq!(reactors.len(), 2);
    assert!(reactors.contains("bob"));
    assert!(reactors.contains("carol"));
}

#[tokio::test]
async fn test_last_remove_drops_symbol() {
    let svc = service();
    let msg = svc.post_message("r1", "alice", "gm", None, None).await.unwrap();

    svc.react_to_message("r1", &msg.id, "👍", "bob", ReactionAction::Add)
        .await
        .unwrap();
    let updated = svc
        .react_to_message("r1", &msg.id, "👍", "bob", ReactionAction::Remove)
        .await
        .unwrap();
    assert!(updated.reactions.get("👍").is_none());

    let page = svc.get_messages("r1", None, None).await.unwrap();
    assert!(page.messages[0].reactions.is_empty());
}

#[tokio::test]
async fn test_react_unknown_message() {
    let svc = service();
    let err = svc
        .react_to_message("r1", "m-missing", "👍", "bob", ReactionAction::Add)
        .await
        .unwrap_err();
    assert_eq!(err, ChatError::MessageNotFound("m-missing".into()));
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_pins_newest_first() {
    let svc = service();
    let posted = post_many(&svc, "r1", "alice", 4).await;

    svc.toggle_pin("r1", &posted[0].id, true).await.unwrap();
    svc.toggle_pin("r1", &posted[2].id, true).await.unwrap();
    svc.toggle_pin("r1", &posted[2].id, true).await.unwrap();

    let pinned = svc.get_pinned_messages("r1").await.unwrap();
    let ids: Vec<_> = pinned.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec![posted[2].id.as_str(), posted[0].id.as_str()]);
    assert_eq!(svc.room_stats("r1").await.unwrap().pinned_count, 2);

    svc.toggle_pin("r1", &posted[0].id, false).await.unwrap();
    assert_eq!(svc.get_pinned_messages("r1").await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_pin_unknown_message() {
    let svc = service();
    assert!(
        svc.toggle_pin("r1", "nope", true)
            .await
            .unwrap_err()
            .is_not_found()
    );
}
