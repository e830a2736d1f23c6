mod common;

use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::{
    RecordingQueue, StubSender, active_credentials, active_follow_up, friday_late,
    open_conversation, test_client, test_rule,
};
use outreach::application::handlers::SequenceStepHandler;
use outreach::application::services::sender::SenderGateway;
use outreach::domain::events::{Job, SequenceStepJob};
use outreach::domain::models::{
    ChannelType, Client, Conversation, FollowUp, FollowUpStatus, SenderKind, SequenceRule,
};
use outreach::domain::repositories::{ConversationRepository, FollowUpRepository};
use outreach::infrastructure::repositories::in_memory::{
    InMemoryClientRepository, InMemoryConversationRepository, InMemoryCredentialsRepository,
    InMemoryFollowUpRepository, InMemoryMessageRepository, InMemorySequenceRuleRepository,
};

struct Harness {
    follow_ups: Arc<InMemoryFollowUpRepository>,
    rules: Arc<InMemorySequenceRuleRepository>,
    clients: Arc<InMemoryClientRepository>,
    conversations: Arc<InMemoryConversationRepository>,
    credentials: Arc<InMemoryCredentialsRepository>,
    messages: Arc<InMemoryMessageRepository>,
    queue: Arc<RecordingQueue>,
    sender: Arc<StubSender>,
    handler: SequenceStepHandler,
}

fn harness_with_sender(sender: Arc<StubSender>) -> Harness {
    let follow_ups = Arc::new(InMemoryFollowUpRepository::new());
    let rules = Arc::new(InMemorySequenceRuleRepository::new());
    let clients = Arc::new(InMemoryClientRepository::new());
    let conversations = Arc::new(InMemoryConversationRepository::new());
    let credentials = Arc::new(InMemoryCredentialsRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());
    let queue = RecordingQueue::new();
    let gateway = SenderGateway::new(vec![sender.clone()]);
    let handler = SequenceStepHandler::new(
        follow_ups.clone(),
        rules.clone(),
        clients.clone(),
        conversations.clone(),
        credentials.clone(),
        messages.clone(),
        gateway,
        queue.clone(),
    );
    Harness {
        follow_ups,
        rules,
        clients,
        conversations,
        credentials,
        messages,
        queue,
        sender,
        handler,
    }
}

fn harness() -> Harness {
    harness_with_sender(StubSender::new(ChannelType::WhatsApp))
}

struct Sequence {
    workspace_id: Uuid,
    client: Client,
    conversation: Conversation,
    follow_up: FollowUp,
    rules: Vec<SequenceRule>,
}

/// One Active follow-up for a client with an open conversation, credentials
/// and the given rule delays.
async fn seed_sequence(h: &Harness, delays: &[i64]) -> Sequence {
    let workspace_id = Uuid::new_v4();
    let client = test_client(workspace_id, "5511999990001", "Ana");
    let conversation = open_conversation(&client);
    let follow_up = active_follow_up(&client, &conversation);

    let rules: Vec<SequenceRule> = delays
        .iter()
        .enumerate()
        .map(|(order, delay_ms)| {
            test_rule(
                workspace_id,
                *delay_ms,
                &format!("Step {} for {{{{name}}}}", order + 1),
                order as i64,
            )
        })
        .collect();

    h.clients.put(client.clone()).await;
    h.conversations.put(conversation.clone()).await;
    h.follow_ups.put(follow_up.clone()).await;
    h.credentials
        .put(active_credentials(workspace_id, ChannelType::WhatsApp))
        .await;
    for rule in &rules {
        h.rules.put(rule.clone()).await;
    }

    Sequence {
        workspace_id,
        client,
        conversation,
        follow_up,
        rules,
    }
}

fn step_job(s: &Sequence, rule_index: usize) -> SequenceStepJob {
    SequenceStepJob {
        follow_up_id: s.follow_up.id,
        rule_id: s.rules[rule_index].id,
        workspace_id: s.workspace_id,
    }
}

#[tokio::test]
async fn first_step_sends_and_schedules_the_next_rule() {
    let h = harness();
    let s = seed_sequence(&h, &[0, 3_600_000]).await;
    let now = friday_late();

    h.handler.run(step_job(&s, 0), now).await.unwrap();

    let follow_up = h.follow_ups.get(s.follow_up.id).await.unwrap().unwrap();
    assert_eq!(follow_up.status, FollowUpStatus::Active);
    assert_eq!(follow_up.current_step_order, 0);
    assert_eq!(follow_up.next_message_at, Some(now + TimeDelta::hours(1)));

    let jobs = h.queue.enqueued().await;
    assert_eq!(jobs.len(), 1);
    match &jobs[0].0 {
        Job::SequenceStep(job) => {
            assert_eq!(job.rule_id, s.rules[1].id);
            assert_eq!(job.follow_up_id, s.follow_up.id);
        }
        other => panic!("expected sequence step job, got {other:?}"),
    }
    assert_eq!(jobs[0].1.delay, Duration::from_secs(3600));
    assert_eq!(
        jobs[0].1.idempotency_key,
        format!("{}:{}", s.follow_up.id, s.rules[1].id)
    );

    assert_eq!(h.sender.sent().await, vec![(
        s.client.address.clone(),
        "Step 1 for Ana".to_string(),
    )]);

    let messages = h.messages.all().await;
    assert_eq!(messages.len(), 1);
    assert_eq!(messages[0].sender, SenderKind::Automated);
    assert_eq!(messages[0].meta.rule_id, Some(s.rules[0].id));

    let conversation = h.conversations.get(s.conversation.id).await.unwrap().unwrap();
    assert_eq!(conversation.last_message_at, Some(now));
}

#[tokio::test]
async fn final_step_completes_the_follow_up() {
    let h = harness();
    let s = seed_sequence(&h, &[0, 3_600_000]).await;
    let start = friday_late();

    h.handler.run(step_job(&s, 0), start).await.unwrap();
    let later = start + TimeDelta::hours(1);
    h.handler.run(step_job(&s, 1), later).await.unwrap();

    let follow_up = h.follow_ups.get(s.follow_up.id).await.unwrap().unwrap();
    assert_eq!(follow_up.status, FollowUpStatus::Completed);
    assert_eq!(follow_up.current_step_order, 1);
    assert_eq!(follow_up.next_message_at, None);
    assert_eq!(follow_up.completed_at, Some(later));

    // Exactly one audit row per successfully-sent rule, no extra jobs.
    assert_eq!(h.messages.all().await.len(), 2);
    assert_eq!(h.queue.enqueued().await.len(), 1);
}

#[tokio::test]
async fn full_chain_reaches_completed_with_one_audit_row_per_rule() {
    let h = harness();
    let s = seed_sequence(&h, &[0, 1_000, 2_000]).await;
    let mut now = friday_late();

    for index in 0..s.rules.len() {
        h.handler.run(step_job(&s, index), now).await.unwrap();
        now += TimeDelta::seconds(5);
    }

    let follow_up = h.follow_ups.get(s.follow_up.id).await.unwrap().unwrap();
    assert_eq!(follow_up.status, FollowUpStatus::Completed);
    assert_eq!(follow_up.current_step_order, (s.rules.len() - 1) as i32);
    assert_eq!(h.messages.all().await.len(), s.rules.len());
    assert_eq!(h.sender.sent().await.len(), s.rules.len());
}

#[tokio::test]
async fn inactive_follow_up_drops_the_step() {
    let h = harness();
    let s = seed_sequence(&h, &[0, 3_600_000]).await;
    h.follow_ups
        .set_status(s.follow_up.id, FollowUpStatus::Paused)
        .await
        .unwrap();

    h.handler.run(step_job(&s, 0), friday_late()).await.unwrap();

    assert!(h.sender.sent().await.is_empty());
    assert!(h.queue.enqueued().await.is_empty());
    let follow_up = h.follow_ups.get(s.follow_up.id).await.unwrap().unwrap();
    assert_eq!(follow_up.status, FollowUpStatus::Paused);
}

#[tokio::test]
async fn unknown_follow_up_is_a_soft_noop() {
    let h = harness();
    let s = seed_sequence(&h, &[0]).await;

    let job = SequenceStepJob {
        follow_up_id: Uuid::new_v4(),
        rule_id: s.rules[0].id,
        workspace_id: s.workspace_id,
    };
    h.handler.run(job, friday_late()).await.unwrap();

    assert!(h.sender.sent().await.is_empty());
}

#[tokio::test]
async fn unknown_rule_is_a_hard_error() {
    let h = harness();
    let s = seed_sequence(&h, &[0]).await;

    let job = SequenceStepJob {
        follow_up_id: s.follow_up.id,
        rule_id: Uuid::new_v4(),
        workspace_id: s.workspace_id,
    };
    let result = h.handler.run(job, friday_late()).await;

    assert!(result.is_err());
    let follow_up = h.follow_ups.get(s.follow_up.id).await.unwrap().unwrap();
    assert_eq!(follow_up.status, FollowUpStatus::Failed);
}

#[tokio::test]
async fn send_failure_marks_follow_up_failed_and_schedules_nothing() {
    let h = harness_with_sender(StubSender::failing(ChannelType::WhatsApp));
    let s = seed_sequence(&h, &[0, 3_600_000]).await;

    let result = h.handler.run(step_job(&s, 0), friday_late()).await;

    assert!(result.is_err());
    let follow_up = h.follow_ups.get(s.follow_up.id).await.unwrap().unwrap();
    assert_eq!(follow_up.status, FollowUpStatus::Failed);
    assert!(h.queue.enqueued().await.is_empty());
    assert!(h.messages.all().await.is_empty());
}

#[tokio::test]
async fn missing_credentials_drop_the_step_unchanged() {
    let h = harness();
    let s = seed_sequence(&h, &[0, 3_600_000]).await;
    // Fresh handler over the same stores, minus credentials.
    let handler = SequenceStepHandler::new(
        h.follow_ups.clone(),
        h.rules.clone(),
        h.clients.clone(),
        h.conversations.clone(),
        Arc::new(InMemoryCredentialsRepository::new()),
        h.messages.clone(),
        SenderGateway::new(vec![h.sender.clone()]),
        h.queue.clone(),
    );

    handler.run(step_job(&s, 0), friday_late()).await.unwrap();

    assert!(h.sender.sent().await.is_empty());
    assert!(h.queue.enqueued().await.is_empty());
    let follow_up = h.follow_ups.get(s.follow_up.id).await.unwrap().unwrap();
    assert_eq!(follow_up.status, FollowUpStatus::Active);
    assert_eq!(follow_up.next_message_at, None);
}
