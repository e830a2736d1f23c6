use std::sync::Arc;
use std::time::Duration;

use poem::{Route, Server, listener::TcpListener};
use poem_openapi::OpenApiService;
use sqlx::postgres::PgPoolOptions;
use tracing::info;
use tracing_subscriber::EnvFilter;

use outreach::{
    application::{
        handlers::{
            CampaignDispatchHandler, ContactDispatchHandler, JobRouter, SequenceStepHandler,
        },
        services::{
            job_queue::JobQueue,
            notifier::RealtimeNotifier,
            resolver::{ContactResolver, LeadHook},
            sender::SenderGateway,
        },
        usecases::{
            cancel_follow_up::CancelFollowUpUseCase, pause_follow_up::PauseFollowUpUseCase,
            start_campaign::StartCampaignUseCase, start_follow_up::StartFollowUpUseCase,
        },
    },
    config::Config,
    domain::{
        events::JobKind,
        repositories::{
            CampaignContactRepository, CampaignRepository, ClientRepository,
            ConversationRepository, CredentialsRepository, FollowUpRepository, MessageRepository,
            SequenceRuleRepository,
        },
    },
    infrastructure::{
        messaging::{
            jetstream::{JetstreamQueue, QueueConfig},
            telegram::TelegramSender,
            whatsapp::WhatsAppSender,
        },
        realtime::{HttpNotifier, LeadWebhook, NoopLeadHook, NoopNotifier},
        repositories::postgres::{
            PostgresCampaignContactRepository, PostgresCampaignRepository,
            PostgresClientRepository, PostgresConversationRepository,
            PostgresCredentialsRepository, PostgresFollowUpRepository, PostgresMessageRepository,
            PostgresSequenceRuleRepository,
        },
        resolver::StoreResolver,
    },
    presentation::http::endpoints::{
        campaigns::CampaignEndpoints, follow_ups::FollowUpEndpoints, health::HealthEndpoints,
        root::ApiState,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::try_parse().map_err(anyhow::Error::msg)?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .connect(&config.database_url)
        .await?;
    sqlx::migrate!().run(&pool).await?;

    let campaigns: Arc<dyn CampaignRepository> = PostgresCampaignRepository::new(pool.clone());
    let contacts: Arc<dyn CampaignContactRepository> =
        PostgresCampaignContactRepository::new(pool.clone());
    let rules: Arc<dyn SequenceRuleRepository> = PostgresSequenceRuleRepository::new(pool.clone());
    let follow_ups: Arc<dyn FollowUpRepository> = PostgresFollowUpRepository::new(pool.clone());
    let clients: Arc<dyn ClientRepository> = PostgresClientRepository::new(pool.clone());
    let conversations: Arc<dyn ConversationRepository> =
        PostgresConversationRepository::new(pool.clone());
    let messages: Arc<dyn MessageRepository> = PostgresMessageRepository::new(pool.clone());
    let credentials: Arc<dyn CredentialsRepository> =
        PostgresCredentialsRepository::new(pool.clone());

    let send_timeout = Duration::from_secs(config.send_timeout_seconds);
    let gateway = SenderGateway::new(vec![
        WhatsAppSender::new(config.whatsapp_api_url.clone(), send_timeout),
        TelegramSender::new(config.telegram_api_url.clone(), send_timeout),
    ]);
    let notifier: Arc<dyn RealtimeNotifier> = match &config.realtime_url {
        Some(url) => HttpNotifier::new(url.clone(), send_timeout),
        None => Arc::new(NoopNotifier),
    };
    let leads: Arc<dyn LeadHook> = match &config.lead_webhook_url {
        Some(url) => LeadWebhook::new(url.clone(), send_timeout),
        None => Arc::new(NoopLeadHook),
    };
    let resolver: Arc<dyn ContactResolver> =
        StoreResolver::new(clients.clone(), conversations.clone());

    let queue = JetstreamQueue::connect(QueueConfig {
        url: config.nats_url.clone(),
        stream: config.queue_stream.clone(),
        subject_prefix: config.queue_subject_prefix.clone(),
        pull_batch: config.queue_pull_batch,
        ack_wait_seconds: config.queue_ack_wait_seconds,
        max_deliver: config.queue_max_deliver,
        retry_delay_seconds: config.queue_retry_delay_seconds,
        dedupe_window_seconds: config.queue_dedupe_window_seconds,
    })
    .await?;
    let job_queue: Arc<dyn JobQueue> = queue.clone();

    let dispatcher = Arc::new(CampaignDispatchHandler::new(
        campaigns.clone(),
        contacts.clone(),
        messages.clone(),
        resolver,
        leads,
        notifier.clone(),
        job_queue.clone(),
    ));
    let contact_dispatch = Arc::new(ContactDispatchHandler::new(
        campaigns.clone(),
        contacts.clone(),
        messages.clone(),
        conversations.clone(),
        credentials.clone(),
        gateway.clone(),
        notifier.clone(),
    ));
    let sequence_step = Arc::new(SequenceStepHandler::new(
        follow_ups.clone(),
        rules.clone(),
        clients.clone(),
        conversations.clone(),
        credentials.clone(),
        messages.clone(),
        gateway,
        job_queue.clone(),
    ));
    let router = Arc::new(JobRouter::new(dispatcher, contact_dispatch, sequence_step));

    queue
        .worker(JobKind::CampaignKickoff, config.dispatcher_concurrency)
        .await?
        .spawn(router.clone());
    queue
        .worker(JobKind::ContactDispatch, config.contact_concurrency)
        .await?
        .spawn(router.clone());
    queue
        .worker(JobKind::SequenceStep, config.sequence_concurrency)
        .await?
        .spawn(router);

    let state = Arc::new(ApiState {
        start_campaign_usecase: Arc::new(StartCampaignUseCase::new(
            campaigns.clone(),
            job_queue.clone(),
        )),
        start_follow_up_usecase: Arc::new(StartFollowUpUseCase::new(
            follow_ups.clone(),
            rules.clone(),
            conversations.clone(),
            job_queue.clone(),
        )),
        pause_follow_up_usecase: Arc::new(PauseFollowUpUseCase::new(follow_ups.clone())),
        cancel_follow_up_usecase: Arc::new(CancelFollowUpUseCase::new(follow_ups)),
    });

    let server_url = format!("http://{}:{}", config.host, config.port);
    info!(url = %server_url, "starting outreach server");

    let api_service = OpenApiService::new(
        (
            HealthEndpoints,
            CampaignEndpoints::new(state.clone()),
            FollowUpEndpoints::new(state),
        ),
        "Outreach API",
        "0.1.0",
    )
    .server(format!("{server_url}/api"));
    let ui = api_service.swagger_ui();
    let app = Route::new().nest("/api", api_service).nest("/", ui);

    Server::new(TcpListener::bind(format!("{}:{}", config.host, config.port)))
        .run(app)
        .await?;
    Ok(())
}
