mod common;

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use pretty_assertions::assert_eq;
use uuid::Uuid;

use common::{
    CountingNotifier, RecordingLeadHook, RecordingQueue, friday_late, test_campaign, test_client,
    test_contact,
};
use outreach::application::handlers::CampaignDispatchHandler;
use outreach::domain::events::{CampaignKickoffJob, Job};
use outreach::domain::models::{CampaignStatus, ContactStatus, MessageStatus};
use outreach::domain::repositories::{CampaignContactRepository, CampaignRepository};
use outreach::infrastructure::repositories::in_memory::{
    InMemoryCampaignContactRepository, InMemoryCampaignRepository, InMemoryClientRepository,
    InMemoryConversationRepository, InMemoryMessageRepository,
};
use outreach::infrastructure::resolver::StoreResolver;

struct Harness {
    campaigns: Arc<InMemoryCampaignRepository>,
    contacts: Arc<InMemoryCampaignContactRepository>,
    messages: Arc<InMemoryMessageRepository>,
    clients: Arc<InMemoryClientRepository>,
    queue: Arc<RecordingQueue>,
    notifier: Arc<CountingNotifier>,
    leads: Arc<RecordingLeadHook>,
    handler: CampaignDispatchHandler,
}

fn harness_with_queue(queue: Arc<RecordingQueue>) -> Harness {
    let campaigns = Arc::new(InMemoryCampaignRepository::new());
    let contacts = Arc::new(InMemoryCampaignContactRepository::new());
    let messages = Arc::new(InMemoryMessageRepository::new());
    let clients = Arc::new(InMemoryClientRepository::new());
    let conversations = Arc::new(InMemoryConversationRepository::new());
    let notifier = CountingNotifier::new();
    let leads = RecordingLeadHook::new();
    let resolver = StoreResolver::new(clients.clone(), conversations.clone());
    let handler = CampaignDispatchHandler::new(
        campaigns.clone(),
        contacts.clone(),
        messages.clone(),
        resolver,
        leads.clone(),
        notifier.clone(),
        queue.clone(),
    );
    Harness {
        campaigns,
        contacts,
        messages,
        clients,
        queue,
        notifier,
        leads,
        handler,
    }
}

fn harness() -> Harness {
    harness_with_queue(RecordingQueue::new())
}

fn kickoff(campaign_id: Uuid, workspace_id: Uuid) -> CampaignKickoffJob {
    CampaignKickoffJob {
        campaign_id,
        workspace_id,
    }
}

/// Monday 2026-08-10 10:00 UTC, mid-window.
fn monday_mid() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 8, 10, 10, 0, 0).unwrap()
}

fn job_send_at(job: &Job) -> DateTime<Utc> {
    match job {
        Job::ContactDispatch(job) => job.send_at,
        other => panic!("expected contact dispatch job, got {other:?}"),
    }
}

#[tokio::test]
async fn empty_campaign_completes_without_jobs() {
    let h = harness();
    let workspace_id = Uuid::new_v4();
    let campaign = test_campaign(workspace_id, 60);
    let campaign_id = campaign.id;
    h.campaigns.put(campaign).await;

    h.handler
        .run(kickoff(campaign_id, workspace_id), friday_late())
        .await
        .unwrap();

    let campaign = h.campaigns.get(campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.status, CampaignStatus::Completed);
    assert!(h.queue.enqueued().await.is_empty());
}

#[tokio::test]
async fn duplicate_kickoff_is_a_noop() {
    let h = harness();
    let workspace_id = Uuid::new_v4();
    let mut campaign = test_campaign(workspace_id, 60);
    campaign.status = CampaignStatus::Running;
    let campaign_id = campaign.id;
    h.campaigns.put(campaign).await;
    h.contacts
        .put(test_contact(campaign_id, "5511999990001", "Ana", 0))
        .await;

    h.handler
        .run(kickoff(campaign_id, workspace_id), friday_late())
        .await
        .unwrap();

    assert!(h.queue.enqueued().await.is_empty());
    let campaign = h.campaigns.get(campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.status, CampaignStatus::Running);
}

#[tokio::test]
async fn pacing_rolls_over_the_weekend() {
    let h = harness();
    let workspace_id = Uuid::new_v4();
    let campaign = test_campaign(workspace_id, 60);
    let campaign_id = campaign.id;
    h.campaigns.put(campaign).await;
    let first = test_contact(campaign_id, "5511999990001", "Ana", 0);
    let second = test_contact(campaign_id, "5511999990002", "Bia", 1);
    let third = test_contact(campaign_id, "5511999990003", "Caio", 2);
    h.contacts.put(first.clone()).await;
    h.contacts.put(second.clone()).await;
    h.contacts.put(third.clone()).await;

    h.handler
        .run(kickoff(campaign_id, workspace_id), friday_late())
        .await
        .unwrap();

    let campaign = h.campaigns.get(campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.status, CampaignStatus::Running);

    let jobs = h.queue.enqueued().await;
    assert_eq!(jobs.len(), 3);
    let send_times: Vec<DateTime<Utc>> = jobs.iter().map(|(job, _)| job_send_at(job)).collect();
    assert_eq!(
        send_times,
        vec![
            friday_late(),
            Utc.with_ymd_and_hms(2026, 8, 10, 9, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2026, 8, 10, 9, 1, 0).unwrap(),
        ]
    );
    // Idempotency keys derive from the contact ids.
    assert_eq!(jobs[0].1.idempotency_key, first.id.to_string());

    for contact_id in [first.id, second.id, third.id] {
        let contact = h.contacts.get(contact_id).await.unwrap().unwrap();
        assert_eq!(contact.status, ContactStatus::Scheduled);
    }

    let messages = h.messages.all().await;
    assert_eq!(messages.len(), 3);
    for message in &messages {
        assert_eq!(message.status, MessageStatus::Pending);
        assert_eq!(message.meta.campaign_id, Some(campaign_id));
    }
    let ana_message = messages
        .iter()
        .find(|m| m.meta.contact_id == Some(first.id))
        .unwrap();
    assert_eq!(ana_message.content, "Hi Ana, check out our offer!");

    assert_eq!(h.notifier.events().await.len(), 3);
}

#[tokio::test]
async fn invalid_address_fails_without_consuming_a_pacing_slot() {
    let h = harness();
    let workspace_id = Uuid::new_v4();
    let campaign = test_campaign(workspace_id, 60);
    let campaign_id = campaign.id;
    h.campaigns.put(campaign).await;
    let first = test_contact(campaign_id, "5511999990001", "Ana", 0);
    let invalid = test_contact(campaign_id, "not-a-number", "Bia", 1);
    let third = test_contact(campaign_id, "5511999990003", "Caio", 2);
    h.contacts.put(first.clone()).await;
    h.contacts.put(invalid.clone()).await;
    h.contacts.put(third.clone()).await;

    h.handler
        .run(kickoff(campaign_id, workspace_id), monday_mid())
        .await
        .unwrap();

    let invalid = h.contacts.get(invalid.id).await.unwrap().unwrap();
    assert_eq!(invalid.status, ContactStatus::Failed);
    assert!(invalid.error.is_some());

    // The failed contact did not consume a slot: the third contact lands on
    // the slot right after the first.
    let jobs = h.queue.enqueued().await;
    assert_eq!(jobs.len(), 2);
    assert_eq!(job_send_at(&jobs[0].0), monday_mid());
    assert_eq!(
        job_send_at(&jobs[1].0),
        Utc.with_ymd_and_hms(2026, 8, 10, 10, 1, 0).unwrap()
    );
}

#[tokio::test]
async fn enqueue_failure_marks_contact_but_still_consumes_the_slot() {
    let workspace_id = Uuid::new_v4();
    let campaign = test_campaign(workspace_id, 60);
    let campaign_id = campaign.id;
    let first = test_contact(campaign_id, "5511999990001", "Ana", 0);
    let second = test_contact(campaign_id, "5511999990002", "Bia", 1);
    let third = test_contact(campaign_id, "5511999990003", "Caio", 2);

    let queue = RecordingQueue::failing_for([second.id.to_string()]);
    let h = harness_with_queue(queue);
    h.campaigns.put(campaign).await;
    h.contacts.put(first.clone()).await;
    h.contacts.put(second.clone()).await;
    h.contacts.put(third.clone()).await;

    h.handler
        .run(kickoff(campaign_id, workspace_id), monday_mid())
        .await
        .unwrap();

    let second = h.contacts.get(second.id).await.unwrap().unwrap();
    assert_eq!(second.status, ContactStatus::Failed);
    let failed_message = h
        .messages
        .all()
        .await
        .into_iter()
        .find(|m| m.meta.contact_id == Some(second.id))
        .unwrap();
    assert_eq!(failed_message.status, MessageStatus::Failed);

    // The failed enqueue consumed a slot, so the third contact is paced two
    // intervals after the first.
    let jobs = h.queue.enqueued().await;
    assert_eq!(jobs.len(), 2);
    assert_eq!(
        job_send_at(&jobs[1].0),
        Utc.with_ymd_and_hms(2026, 8, 10, 10, 2, 0).unwrap()
    );
    let third = h.contacts.get(third.id).await.unwrap().unwrap();
    assert_eq!(third.status, ContactStatus::Scheduled);
}

#[tokio::test]
async fn campaign_with_only_invalid_contacts_completes() {
    let h = harness();
    let workspace_id = Uuid::new_v4();
    let campaign = test_campaign(workspace_id, 60);
    let campaign_id = campaign.id;
    h.campaigns.put(campaign).await;
    h.contacts
        .put(test_contact(campaign_id, "bogus", "Ana", 0))
        .await;
    h.contacts
        .put(test_contact(campaign_id, "also bogus", "Bia", 1))
        .await;

    h.handler
        .run(kickoff(campaign_id, workspace_id), monday_mid())
        .await
        .unwrap();

    // No dispatch job will ever fire, so the planner itself must close the
    // campaign out.
    assert!(h.queue.enqueued().await.is_empty());
    let campaign = h.campaigns.get(campaign_id).await.unwrap().unwrap();
    assert_eq!(campaign.status, CampaignStatus::Completed);
}

#[tokio::test]
async fn lead_hook_fires_only_for_new_clients() {
    let h = harness();
    let workspace_id = Uuid::new_v4();
    let campaign = test_campaign(workspace_id, 0);
    let campaign_id = campaign.id;
    h.campaigns.put(campaign).await;

    // The first contact's client already exists.
    let known = test_client(workspace_id, "5511999990001", "Ana");
    h.clients.put(known).await;
    h.contacts
        .put(test_contact(campaign_id, "5511999990001", "Ana", 0))
        .await;
    h.contacts
        .put(test_contact(campaign_id, "5511999990002", "Bia", 1))
        .await;

    h.handler
        .run(kickoff(campaign_id, workspace_id), monday_mid())
        .await
        .unwrap();

    assert_eq!(h.leads.created().await.len(), 1);
    assert_eq!(h.queue.enqueued().await.len(), 2);
}
