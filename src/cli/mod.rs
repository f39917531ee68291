//! CLI module for the hireflow command-line client.
//!
//! Provides subcommands for working against a hiring backend:
//! - `login` / `register` / `logout` / `whoami` - Manage the local session
//! - `profile` - Show or edit the signed-in profile
//! - `services` - List the service catalog
//! - `requests` - Submit, list, price and progress hiring requests
//! - `pay <id>` - Pay the quoted price of a request
//! - `chat` / `notifications` - Conversations and notifications
//! - `watch` - Follow conversations, messages and notifications live
//! - `dashboard` - Your own request and spending summary
//! - `admin` - Dashboard statistics, analytics and user management
//! - `portfolio` - Skills and resume
//! - `config check` - Validate configuration file

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};
use clap::builder::BoolishValueParser;
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::Config;
use crate::error::ClientError;
use crate::hiring::{RequestDraft, TransitionPolicy};
use crate::models::{
    skills_by_category, unread_count, Account, AnalyticsQuery, AnalyticsSummary, GroupBy,
    HiringRequest, Metric, Priority, ProfileUpdate, RegisterData, RequestStatus, Requester,
};
use crate::payment::{CheckoutOutcome, PaymentMethod};
use crate::sync::{self, Subscription, SubscriptionConfig, SyncEvent, Timeline};
use crate::Hireflow;

/// CLI arguments structure
#[derive(Parser, Debug)]
#[command(name = "hireflow")]
#[command(author, version, about = "Client for the hireflow hiring backend", long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "hireflow.toml")]
    pub config: PathBuf,

    /// Override log level
    #[arg(short, long)]
    pub log_level: Option<String>,

    /// API base URL (default: http://localhost:8000/api/v1)
    #[arg(long, env = "HIREFLOW_API_URL")]
    pub api_url: Option<String>,

    /// Payment processor publishable key
    #[arg(long, env = "HIREFLOW_PUBLISHABLE_KEY")]
    pub publishable_key: Option<String>,

    /// Directory holding the local session store
    #[arg(long, env = "HIREFLOW_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Sign in and store the session locally
    Login {
        email: String,
        /// Password (can also be set via HIREFLOW_PASSWORD env var)
        #[arg(long, env = "HIREFLOW_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and sign in
    Register {
        email: String,
        #[arg(long, env = "HIREFLOW_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show who is signed in
    Whoami,

    /// Profile management commands
    #[command(subcommand)]
    Profile(ProfileCommands),

    /// List active services
    Services,

    /// Hiring request commands
    #[command(subcommand)]
    Requests(RequestCommands),

    /// Pay the quoted price of a request
    Pay {
        /// Request ID
        id: u64,
        /// Processor payment method token (e.g. pm_card_visa)
        #[arg(long)]
        payment_method: String,
    },

    /// Conversation commands
    #[command(subcommand)]
    Chat(ChatCommands),

    /// Notification commands
    #[command(subcommand)]
    Notifications(NotificationCommands),

    /// Follow conversations and notifications until interrupted
    Watch {
        /// Also follow the messages of this conversation
        #[arg(long)]
        conversation: Option<u64>,
    },

    /// Show your own dashboard
    Dashboard,

    /// Admin dashboard and user management commands
    #[command(subcommand)]
    Admin(AdminCommands),

    /// Portfolio commands
    #[command(subcommand)]
    Portfolio(PortfolioCommands),

    /// Configuration management commands
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand, Debug)]
pub enum ProfileCommands {
    /// Fetch the profile from the server
    Show,
    /// Update profile fields
    Update {
        #[arg(long)]
        first_name: Option<String>,
        #[arg(long)]
        last_name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        bio: Option<String>,
        /// Image file to upload as avatar
        #[arg(long)]
        avatar: Option<PathBuf>,
    },
    /// Change the account password
    Password {
        #[arg(long)]
        old: String,
        #[arg(long)]
        new: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum RequestCommands {
    /// List requests (all of them for admins, your own otherwise)
    List {
        /// Look up requests submitted anonymously with this email
        #[arg(long)]
        email: Option<String>,
        /// Only requests in this status
        #[arg(long)]
        status: Option<RequestStatus>,
    },
    /// Show details for a request
    Show { id: u64 },
    /// Submit a new request
    Create {
        #[arg(long)]
        title: String,
        #[arg(long)]
        description: String,
        /// Service type ID (see `hireflow services`)
        #[arg(long)]
        service: Option<u64>,
        #[arg(long)]
        requirements: Option<String>,
        /// low, medium or high
        #[arg(long, default_value = "medium")]
        priority: Priority,
        /// Deadline as YYYY-MM-DD
        #[arg(long)]
        deadline: Option<NaiveDate>,
        /// Your name (anonymous requests only)
        #[arg(long)]
        name: Option<String>,
        /// Your email (anonymous requests only)
        #[arg(long)]
        email: Option<String>,
    },
    /// Quote a price for a pending request (admin)
    Price { id: u64, amount: String },
    /// Move a request to another status (admin)
    Status { id: u64, status: RequestStatus },
    /// Replace the admin notes of a request (admin)
    Notes { id: u64, notes: String },
    /// Delete a request
    Delete { id: u64 },
}

#[derive(Subcommand, Debug)]
pub enum ChatCommands {
    /// List conversations
    Conversations,
    /// Show a conversation and its participants
    Show { id: u64 },
    /// Delete a conversation
    Delete { id: u64 },
    /// Show the messages of a conversation
    Messages { id: u64 },
    /// Send a message
    Send {
        id: u64,
        content: String,
        /// File to attach
        #[arg(long)]
        attach: Option<PathBuf>,
    },
    /// Start a conversation with another user
    Start { participant: u64 },
    /// List users you can start a conversation with
    Users,
}

#[derive(Subcommand, Debug)]
pub enum NotificationCommands {
    /// List notifications
    List,
    /// Mark one notification read
    Read { id: u64 },
    /// Mark every notification read
    ReadAll,
}

#[derive(Subcommand, Debug)]
pub enum AdminCommands {
    /// Show dashboard statistics
    Stats,
    /// Show request and revenue analytics
    Analytics {
        /// Window length in days, ending today
        #[arg(long, default_value = "30")]
        days: u32,
        /// day, week or month
        #[arg(long, default_value = "day")]
        group_by: GroupBy,
    },
    /// List user accounts
    Users,
    /// Show one user account
    User { id: u64 },
    /// Grant or revoke admin rights
    SetStaff {
        id: u64,
        /// true/false, yes/no, on/off
        #[arg(action = ArgAction::Set, value_parser = BoolishValueParser::new())]
        staff: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PortfolioCommands {
    /// List skills by category
    Skills,
    /// Show the resume
    Resume,
    /// Download the resume document
    Download {
        #[arg(short, long, default_value = "resume.pdf")]
        output: PathBuf,
    },
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Validate configuration file
    Check,
}

// ============================================================================
// CLI Command Handlers
// ============================================================================

/// Run a CLI command
pub async fn run_command(cli: &Cli, config: Config) -> Result<()> {
    if let Commands::Config(ConfigCommands::Check) = &cli.command {
        return cmd_config_check(cli, &config);
    }

    let app = Hireflow::open(config)?;

    match &cli.command {
        Commands::Login { email, password } => cmd_login(&app, email, password).await,
        Commands::Register {
            email,
            password,
            first_name,
            last_name,
        } => {
            let data = RegisterData {
                email: email.clone(),
                password: password.clone(),
                first_name: first_name.clone(),
                last_name: last_name.clone(),
            };
            cmd_register(&app, data).await
        }
        Commands::Logout => cmd_logout(&app).await,
        Commands::Whoami => cmd_whoami(&app),
        Commands::Profile(ProfileCommands::Show) => cmd_profile_show(&app).await,
        Commands::Profile(ProfileCommands::Update {
            first_name,
            last_name,
            email,
            bio,
            avatar,
        }) => {
            let update = ProfileUpdate {
                first_name: first_name.clone(),
                last_name: last_name.clone(),
                email: email.clone(),
                bio: bio.clone(),
                avatar: avatar.clone(),
            };
            cmd_profile_update(&app, update).await
        }
        Commands::Profile(ProfileCommands::Password { old, new }) => {
            app.session
                .change_password(old, new)
                .await
                .context("Failed to change password")?;
            println!("Password changed.");
            Ok(())
        }
        Commands::Services => cmd_services(&app).await,
        Commands::Requests(RequestCommands::List { email, status }) => {
            cmd_requests_list(&app, email.as_deref(), *status).await
        }
        Commands::Requests(RequestCommands::Show { id }) => cmd_requests_show(&app, *id).await,
        Commands::Requests(RequestCommands::Create {
            title,
            description,
            service,
            requirements,
            priority,
            deadline,
            name,
            email,
        }) => {
            let draft = RequestDraft {
                title: title.clone(),
                description: description.clone(),
                requirements: requirements.clone(),
                service_type: *service,
                priority: *priority,
                deadline: *deadline,
                name: name.clone(),
                email: email.clone(),
            };
            cmd_requests_create(&app, &draft).await
        }
        Commands::Requests(RequestCommands::Price { id, amount }) => {
            let request = app.hiring.set_price(*id, amount).await?;
            println!(
                "Quoted {} for {}.",
                format_amount(request.quoted_price),
                request.ticket_number
            );
            Ok(())
        }
        Commands::Requests(RequestCommands::Status { id, status }) => {
            cmd_requests_status(&app, *id, *status).await
        }
        Commands::Requests(RequestCommands::Notes { id, notes }) => {
            let request = app.hiring.set_notes(*id, notes).await?;
            println!("Notes saved for {}.", request.ticket_number);
            Ok(())
        }
        Commands::Requests(RequestCommands::Delete { id }) => {
            app.hiring.delete(*id).await?;
            println!("Request {} deleted.", id);
            Ok(())
        }
        Commands::Pay { id, payment_method } => cmd_pay(&app, *id, payment_method).await,
        Commands::Chat(ChatCommands::Conversations) => cmd_conversations(&app).await,
        Commands::Chat(ChatCommands::Show { id }) => cmd_conversation_show(&app, *id).await,
        Commands::Chat(ChatCommands::Delete { id }) => {
            app.api.chat().delete_conversation(*id).await?;
            println!("Conversation {} deleted.", id);
            Ok(())
        }
        Commands::Chat(ChatCommands::Messages { id }) => cmd_messages(&app, *id).await,
        Commands::Chat(ChatCommands::Send {
            id,
            content,
            attach,
        }) => cmd_send(&app, *id, content, attach.as_deref()).await,
        Commands::Chat(ChatCommands::Start { participant }) => {
            let conversation = app.api.chat().create_conversation(*participant).await?;
            println!("Conversation {} started.", conversation.id);
            Ok(())
        }
        Commands::Chat(ChatCommands::Users) => cmd_users(&app).await,
        Commands::Notifications(NotificationCommands::List) => cmd_notifications(&app).await,
        Commands::Notifications(NotificationCommands::Read { id }) => {
            app.api.chat().mark_notification_read(*id).await?;
            println!("Notification {} marked read.", id);
            Ok(())
        }
        Commands::Notifications(NotificationCommands::ReadAll) => {
            app.api.chat().mark_all_notifications_read().await?;
            println!("All notifications marked read.");
            Ok(())
        }
        Commands::Watch { conversation } => cmd_watch(&app, *conversation).await,
        Commands::Dashboard => cmd_dashboard(&app).await,
        Commands::Admin(AdminCommands::Stats) => cmd_admin_stats(&app).await,
        Commands::Admin(AdminCommands::Analytics { days, group_by }) => {
            cmd_admin_analytics(&app, *days, *group_by).await
        }
        Commands::Admin(AdminCommands::Users) => cmd_admin_users(&app).await,
        Commands::Admin(AdminCommands::User { id }) => {
            let account = app.api.admin().user(*id).await?;
            print_account(&account);
            Ok(())
        }
        Commands::Admin(AdminCommands::SetStaff { id, staff }) => {
            let account = app.api.admin().set_staff(*id, *staff).await?;
            println!("{} is now {}.", account.email, account.role_label());
            Ok(())
        }
        Commands::Portfolio(PortfolioCommands::Skills) => cmd_skills(&app).await,
        Commands::Portfolio(PortfolioCommands::Resume) => cmd_resume(&app).await,
        Commands::Portfolio(PortfolioCommands::Download { output }) => {
            let written = app.api.portfolio().download_resume(output).await?;
            println!("Saved resume to {} ({} bytes).", output.display(), written);
            Ok(())
        }
        Commands::Config(ConfigCommands::Check) => Ok(()),
    }
}

async fn cmd_login(app: &Hireflow, email: &str, password: &str) -> Result<()> {
    let user = app.session.login(email, password).await?;
    println!("Logged in as {} ({}).", user.full_name(), user.email);
    Ok(())
}

async fn cmd_register(app: &Hireflow, data: RegisterData) -> Result<()> {
    let user = app.session.register(data).await?;
    println!("Account created. Logged in as {}.", user.email);
    Ok(())
}

async fn cmd_logout(app: &Hireflow) -> Result<()> {
    if !app.session.is_authenticated() {
        println!("Not logged in.");
        return Ok(());
    }
    app.session.logout().await;
    println!("Logged out.");
    Ok(())
}

fn cmd_whoami(app: &Hireflow) -> Result<()> {
    match app.session.current_user() {
        Some(user) => {
            println!("Name:   {}", user.full_name());
            println!("Email:  {}", user.email);
            println!("Role:   {}", if user.is_admin() { "admin" } else { "user" });
        }
        None => {
            println!("Not logged in.");
            if let Some(email) = app.session.cell().anonymous_email() {
                println!("Anonymous requests are looked up as {}.", email);
            }
        }
    }
    Ok(())
}

async fn cmd_profile_show(app: &Hireflow) -> Result<()> {
    let user = app.session.fetch_profile().await?;

    println!();
    println!("=== Profile: {} ===", user.full_name());
    println!();
    println!("ID:          {}", user.id);
    println!("Email:       {}", user.email);
    println!("First name:  {}", user.first_name);
    println!("Last name:   {}", user.last_name);
    println!("Bio:         {}", user.bio.as_deref().unwrap_or("-"));
    println!("Avatar:      {}", user.avatar.as_deref().unwrap_or("-"));
    println!();
    Ok(())
}

async fn cmd_profile_update(app: &Hireflow, update: ProfileUpdate) -> Result<()> {
    if update.is_empty() {
        println!("Nothing to update.");
        return Ok(());
    }
    let user = app.session.update_profile(update).await?;
    println!("Profile updated for {}.", user.email);
    Ok(())
}

async fn cmd_services(app: &Hireflow) -> Result<()> {
    let services = app.hiring.services().await?;

    if services.is_empty() {
        println!("No services available.");
        return Ok(());
    }

    println!();
    println!("{:<6}  {:<30}  {:>12}  {:<40}", "ID", "NAME", "BASE PRICE", "DESCRIPTION");
    println!("{}", "-".repeat(94));
    for service in services {
        println!(
            "{:<6}  {:<30}  {:>12}  {:<40}",
            service.id,
            truncate(&service.name, 30),
            format_amount(Some(service.base_price)),
            truncate(&service.description, 40)
        );
    }
    println!();
    Ok(())
}

async fn cmd_requests_list(
    app: &Hireflow,
    email: Option<&str>,
    status: Option<RequestStatus>,
) -> Result<()> {
    let requests = app.hiring.list(email, status).await?;

    if requests.is_empty() {
        println!("No requests found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<6}  {:<16}  {:<30}  {:<12}  {:<8}  {:>12}",
        "ID", "TICKET", "TITLE", "STATUS", "PRIORITY", "PRICE"
    );
    println!("{}", "-".repeat(96));
    for request in requests {
        println!(
            "{:<6}  {:<16}  {:<30}  {:<12}  {:<8}  {:>12}",
            request.id,
            truncate(&request.ticket_number, 16),
            truncate(&request.title, 30),
            request.status,
            request.priority,
            format_amount(request.quoted_price)
        );
    }
    println!();
    Ok(())
}

async fn cmd_requests_status(app: &Hireflow, id: u64, status: RequestStatus) -> Result<()> {
    match app.hiring.set_status(id, status).await {
        Ok(request) => {
            println!("{} is now {}.", request.ticket_number, request.status);
            Ok(())
        }
        Err(e @ ClientError::InvalidTransition { from, .. }) => {
            anyhow::bail!("{}. {}", e, transition_hint(app.hiring.policy(), from))
        }
        Err(e) => Err(e.into()),
    }
}

/// Where a request in `from` may go next, for error output.
fn transition_hint(policy: TransitionPolicy, from: RequestStatus) -> String {
    let targets = policy.targets(from);
    if targets.is_empty() {
        return format!("A {} request cannot change status", from);
    }
    let names: Vec<String> = targets.iter().map(ToString::to_string).collect();
    format!("Allowed from {}: {}", from, names.join(", "))
}

async fn cmd_requests_show(app: &Hireflow, id: u64) -> Result<()> {
    let request = app.hiring.get(id).await?;
    print_request(&request);
    Ok(())
}

fn print_request(request: &HiringRequest) {
    println!();
    println!("=== Request: {} ===", request.ticket_number);
    println!();
    println!("ID:          {}", request.id);
    println!("Title:       {}", request.title);
    println!("Status:      {}", request.status);
    println!("Priority:    {}", request.priority);
    if let Some(service) = &request.service_type {
        println!(
            "Service:     {}",
            service
                .name()
                .map(str::to_string)
                .unwrap_or_else(|| format!("#{}", service.id()))
        );
    }
    println!("Price:       {}", format_amount(request.quoted_price));
    if let Some(deadline) = request.deadline {
        println!("Deadline:    {}", deadline);
    }
    match request.requester() {
        Requester::User(user) => println!("Requester:   {} <{}>", user.display_name(), user.email),
        Requester::Anonymous { name, email } => println!("Requester:   {} <{}>", name, email),
        Requester::Unknown => println!("Requester:   -"),
    }
    if let Some(created) = request.created_at {
        println!("Created:     {}", created);
    }
    println!();
    println!("{}", request.description);
    if let Some(requirements) = request.requirements.as_deref().filter(|r| !r.is_empty()) {
        println!();
        println!("Requirements:");
        println!("{}", requirements);
    }
    if let Some(notes) = request.admin_notes.as_deref().filter(|n| !n.is_empty()) {
        println!();
        println!("Admin notes:");
        println!("{}", notes);
    }
    println!();
}

async fn cmd_requests_create(app: &Hireflow, draft: &RequestDraft) -> Result<()> {
    let today = Local::now().date_naive();
    let request = app.hiring.submit(draft, today).await?;

    println!("Request submitted. Ticket number: {}", request.ticket_number);
    if !app.session.is_authenticated() {
        println!("Use 'hireflow requests list' to check on it later from this machine.");
    }
    Ok(())
}

async fn cmd_pay(app: &Hireflow, id: u64, payment_method: &str) -> Result<()> {
    let method = PaymentMethod::new(payment_method)?;
    let checkout = app
        .checkout()
        .context("Payments are not available. Set HIREFLOW_PUBLISHABLE_KEY or payment.publishable_key")?;
    let request = app.hiring.get(id).await?;

    println!(
        "Paying {} for {}...",
        format_amount(request.quoted_price),
        request.ticket_number
    );

    match checkout.pay(&request, &method).await? {
        CheckoutOutcome::Succeeded { amount, .. } => {
            println!("[OK] Payment of {} received.", format_amount(Some(amount)));
            Ok(())
        }
        CheckoutOutcome::Failed { error, .. } => anyhow::bail!("{}", error),
        CheckoutOutcome::StatusUpdateFailed { message, .. } => anyhow::bail!("{}", message),
    }
}

async fn cmd_conversations(app: &Hireflow) -> Result<()> {
    let conversations = app.api.chat().conversations().await?;

    if conversations.is_empty() {
        println!("No conversations yet.");
        return Ok(());
    }

    let me = app.session.current_user().map(|u| u.id);
    println!();
    println!("{:<6}  {:<30}  {:>6}  {:<40}", "ID", "WITH", "UNREAD", "LAST MESSAGE");
    println!("{}", "-".repeat(88));
    for conversation in conversations {
        let with = conversation
            .participants
            .iter()
            .filter(|p| Some(p.id) != me)
            .map(|p| p.display_name())
            .collect::<Vec<_>>()
            .join(", ");
        let last = conversation
            .last_message
            .as_ref()
            .map(|m| m.content.as_str())
            .unwrap_or("-");
        println!(
            "{:<6}  {:<30}  {:>6}  {:<40}",
            conversation.id,
            truncate(&with, 30),
            conversation.unread_count,
            truncate(last, 40)
        );
    }
    println!();
    Ok(())
}

async fn cmd_conversation_show(app: &Hireflow, id: u64) -> Result<()> {
    let conversation = app.api.chat().conversation(id).await?;

    println!();
    println!("=== Conversation {} ===", conversation.id);
    println!();
    println!("Active:      {}", if conversation.is_active { "yes" } else { "no" });
    println!("Unread:      {}", conversation.unread_count);
    if let Some(created) = conversation.created_at {
        println!("Started:     {}", created);
    }
    println!("Participants:");
    for participant in &conversation.participants {
        println!("  {:<6} {} <{}>", participant.id, participant.display_name(), participant.email);
    }
    println!();
    Ok(())
}

async fn cmd_messages(app: &Hireflow, id: u64) -> Result<()> {
    let messages = app.api.chat().messages(id).await?;
    let mut timeline = Timeline::new(id);
    timeline.sync(messages);

    if timeline.entries().is_empty() {
        println!("No messages in this conversation.");
        return Ok(());
    }

    for message in timeline.confirmed() {
        println!(
            "[{}] {}: {}",
            message.created_at.format("%Y-%m-%d %H:%M"),
            message.sender.display_name(),
            message.content
        );
        if let Some(name) = &message.file_name {
            println!("        attachment: {}", name);
        }
    }

    if let Err(e) = app.api.chat().mark_conversation_read(id).await {
        tracing::debug!(conversation_id = id, error = %e, "Could not mark conversation read");
    }
    Ok(())
}

async fn cmd_send(
    app: &Hireflow,
    id: u64,
    content: &str,
    attachment: Option<&std::path::Path>,
) -> Result<()> {
    let mut timeline = Timeline::new(id);
    let message = sync::send_message(&app.api, &mut timeline, content, attachment).await?;
    println!("Message {} sent.", message.id);
    Ok(())
}

async fn cmd_users(app: &Hireflow) -> Result<()> {
    let users = app.api.chat().available_users().await?;

    if users.is_empty() {
        println!("No users available.");
        return Ok(());
    }

    println!();
    println!("{:<6}  {:<30}  {:<40}", "ID", "NAME", "EMAIL");
    println!("{}", "-".repeat(80));
    for user in users {
        println!(
            "{:<6}  {:<30}  {:<40}",
            user.id,
            truncate(&user.display_name(), 30),
            truncate(&user.email, 40)
        );
    }
    println!();
    Ok(())
}

async fn cmd_notifications(app: &Hireflow) -> Result<()> {
    let notifications = app.api.chat().notifications().await?;

    if notifications.is_empty() {
        println!("No notifications.");
        return Ok(());
    }

    println!();
    println!("{} unread", unread_count(&notifications));
    println!();
    for notification in &notifications {
        let marker = if notification.is_read { "   " } else { "[*]" };
        println!(
            "{} {:<6}  {:<10}  {}",
            marker,
            notification.id,
            notification.kind,
            truncate(&notification.title, 60)
        );
    }
    println!();
    Ok(())
}

async fn cmd_watch(app: &Hireflow, conversation: Option<u64>) -> Result<()> {
    if !app.session.is_authenticated() {
        anyhow::bail!("Please log in first");
    }

    let config = SubscriptionConfig::from(&app.config.sync);
    let (subscription, mut events) = Subscription::spawn(Arc::new(app.api.clone()), config, 32);
    subscription.open_conversation(conversation);
    let mut timeline = conversation.map(Timeline::new);

    println!("Watching for updates. Press Ctrl+C to stop.");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            event = events.recv() => {
                let Some(event) = event else { break };
                match event {
                    SyncEvent::Conversations(conversations) => {
                        let unread: u32 = conversations.iter().map(|c| c.unread_count).sum();
                        println!("conversations: {} ({} unread messages)", conversations.len(), unread);
                    }
                    SyncEvent::Messages { messages, .. } => {
                        if let Some(timeline) = timeline.as_mut() {
                            let before = timeline.confirmed().count();
                            timeline.sync(messages);
                            for message in timeline.confirmed().skip(before) {
                                println!("{}: {}", message.sender.display_name(), message.content);
                            }
                        }
                    }
                    SyncEvent::Notifications(notifications) => {
                        println!("notifications: {} unread", unread_count(&notifications));
                    }
                    SyncEvent::FeedError { feed, error, retry_in } => {
                        eprintln!("[!!] {} refresh failed: {} (retrying in {:?})", feed, error, retry_in);
                    }
                    SyncEvent::SessionExpired => {
                        eprintln!("Session expired, please log in again.");
                        break;
                    }
                }
            }
        }
    }

    subscription.shutdown().await;
    Ok(())
}

async fn cmd_dashboard(app: &Hireflow) -> Result<()> {
    let dashboard = app.api.dashboard().user_dashboard().await?;
    let stats = &dashboard.stats;

    println!();
    println!("=== Your Dashboard ===");
    println!();
    println!("Requests:   {}", stats.total_requests);
    println!("  Active:   {}", stats.active_requests);
    println!("  Done:     {}", stats.completed_requests);
    println!("Spent:      {}", format_amount(Some(stats.total_spent)));

    if !dashboard.recent_activities.is_empty() {
        println!();
        println!("Recent activity:");
        for activity in &dashboard.recent_activities {
            println!(
                "  {:<30} {:<12} {}",
                truncate(&activity.title, 30),
                activity.status,
                format_amount(activity.quoted_price)
            );
        }
    }
    let unread: Vec<_> = dashboard.notifications.iter().filter(|n| !n.is_read).collect();
    if !unread.is_empty() {
        println!();
        println!("Unread notifications:");
        for notice in unread {
            println!("  [*] {}", truncate(&notice.title, 60));
        }
    }
    println!();
    Ok(())
}

async fn cmd_admin_stats(app: &Hireflow) -> Result<()> {
    let stats = app.api.dashboard().admin_stats().await?;

    println!();
    println!("=== Dashboard ===");
    println!();
    println!("Requests:   {}", stats.total_requests);
    println!("  Pending:  {}", stats.pending_requests);
    println!("  Done:     {}", stats.completed_requests);
    println!("Revenue:    {}", format_amount(Some(stats.total_revenue)));

    if !stats.requests_by_status.is_empty() {
        println!();
        println!("By status:");
        for entry in &stats.requests_by_status {
            println!("  {:<14} {}", entry.status, entry.count);
        }
    }
    if !stats.requests_by_service.is_empty() {
        println!();
        println!("By service:");
        for entry in &stats.requests_by_service {
            println!("  {:<30} {}", truncate(&entry.service, 30), entry.count);
        }
    }
    if !stats.recent_requests.is_empty() {
        println!();
        println!("Recent:");
        for request in &stats.recent_requests {
            println!(
                "  {:<16} {:<30} {}",
                request.ticket_number,
                truncate(&request.title, 30),
                request.status
            );
        }
    }
    println!();
    Ok(())
}

async fn cmd_admin_analytics(app: &Hireflow, days: u32, group_by: GroupBy) -> Result<()> {
    let mut query = AnalyticsQuery::last_days(Local::now().date_naive(), days);
    query.group_by = group_by;
    let points = app.api.dashboard().analytics(&query).await?;

    let Some(summary) = AnalyticsSummary::from_points(&points) else {
        println!("No data for {} to {}.", query.start_date, query.end_date);
        return Ok(());
    };

    println!();
    println!(
        "=== Analytics {} to {} (by {}) ===",
        query.start_date, query.end_date, query.group_by
    );
    println!();
    println!("{:<12}  {:>12}  {:>12}  {:>8}", "METRIC", "TOTAL", "AVERAGE", "TREND");
    println!("{}", "-".repeat(50));
    print_metric("Requests", &summary.requests);
    print_metric("Revenue", &summary.revenue);
    print_metric("Completed", &summary.completions);
    println!();
    Ok(())
}

async fn cmd_admin_users(app: &Hireflow) -> Result<()> {
    let users = app.api.admin().users().await?;

    if users.is_empty() {
        println!("No users found.");
        return Ok(());
    }

    println!();
    println!(
        "{:<6}  {:<24}  {:<30}  {:<6}  {:<8}  {:<10}",
        "ID", "NAME", "EMAIL", "ROLE", "STATUS", "JOINED"
    );
    println!("{}", "-".repeat(94));
    for user in users {
        println!(
            "{:<6}  {:<24}  {:<30}  {:<6}  {:<8}  {:<10}",
            user.id,
            truncate(&user.full_name(), 24),
            truncate(&user.email, 30),
            user.role_label(),
            if user.is_active { "active" } else { "inactive" },
            user.date_joined
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_else(|| "-".to_string())
        );
    }
    println!();
    Ok(())
}

fn print_account(account: &Account) {
    println!();
    println!("=== User: {} ===", account.email);
    println!();
    println!("ID:          {}", account.id);
    println!("Name:        {}", account.full_name());
    println!("Role:        {}", account.role_label());
    println!("Active:      {}", if account.is_active { "yes" } else { "no" });
    if let Some(joined) = account.date_joined {
        println!("Joined:      {}", joined);
    }
    match account.last_login {
        Some(login) => println!("Last login:  {}", login),
        None => println!("Last login:  never"),
    }
    println!();
}

async fn cmd_skills(app: &Hireflow) -> Result<()> {
    let skills = app.api.portfolio().skills().await?;

    if skills.is_empty() {
        println!("No skills listed.");
        return Ok(());
    }

    for (category, group) in skills_by_category(skills) {
        println!();
        println!("{}:", category);
        for skill in group {
            let star = if skill.is_featured { "*" } else { " " };
            println!(
                "  {} {:<24} {:>3}%  {} yrs",
                star,
                truncate(&skill.name, 24),
                skill.proficiency,
                skill.years_experience
            );
        }
    }
    println!();
    Ok(())
}

async fn cmd_resume(app: &Hireflow) -> Result<()> {
    let resume = app.api.portfolio().resume().await?;

    if !resume.experience.is_empty() {
        println!();
        println!("=== Experience ===");
        for job in &resume.experience {
            println!();
            println!("{} at {} ({} to {})", job.position, job.company, job.start_date, job.end_date);
            if !job.description.is_empty() {
                println!("  {}", job.description);
            }
            for achievement in &job.achievements {
                println!("  - {}", achievement);
            }
        }
    }
    if !resume.education.is_empty() {
        println!();
        println!("=== Education ===");
        for school in &resume.education {
            println!();
            println!(
                "{}, {} in {} ({} to {})",
                school.school, school.degree, school.field, school.start_date, school.end_date
            );
        }
    }
    if !resume.projects.is_empty() {
        println!();
        println!("=== Projects ===");
        for project in &resume.projects {
            println!();
            println!("{}: {}", project.name, project.description);
            if let Some(link) = &project.link {
                println!("  {}", link);
            }
        }
    }
    for group in &resume.skills {
        println!();
        println!("{}: {}", group.category, group.items.join(", "));
    }
    println!();
    Ok(())
}

fn print_metric(name: &str, metric: &Metric) {
    let trend = metric
        .trend
        .map(|t| format!("{:+.1}%", t))
        .unwrap_or_else(|| "-".to_string());
    println!(
        "{:<12}  {:>12.2}  {:>12.2}  {:>8}",
        name, metric.total, metric.average, trend
    );
}

/// Validate configuration file
fn cmd_config_check(cli: &Cli, config: &Config) -> Result<()> {
    let config_path = &cli.config;

    println!("Checking configuration file: {}", config_path.display());
    println!();

    if !config_path.exists() {
        println!(
            "[!!] Configuration file not found: {}",
            config_path.display()
        );
        println!();
        println!("Defaults and environment overrides will be used.");
    } else {
        println!("[OK] Configuration file is valid!");
    }

    println!();
    println!("=== Configuration Summary ===");
    println!();
    println!("API:");
    println!("  Base URL:     {}", config.api.base_url);
    println!("  Timeout:      {}s", config.api.timeout_secs);
    println!();
    println!("Payment:");
    println!(
        "  Publishable key: {}",
        if config.payment.publishable_key.is_some() {
            "Set"
        } else {
            "Not set (payments disabled)"
        }
    );
    println!("  Processor:    {}", config.payment.processor_url);
    println!("  Currency:     {}", config.payment.currency);
    println!("  Confirmation: {:?}", config.payment.confirmation);
    println!();
    println!("Storage:");
    println!("  Data Dir:     {}", config.storage.data_dir.display());
    println!();
    println!("Sync:");
    println!(
        "  Intervals:    conversations {}s, messages {}s, notifications {}s",
        config.sync.conversations_interval_secs,
        config.sync.messages_interval_secs,
        config.sync.notifications_interval_secs
    );
    println!("  Max backoff:  {}s", config.sync.max_backoff_secs);
    println!();
    println!(
        "Transitions:    {}",
        if config.lifecycle.strict_transitions {
            "Strict"
        } else {
            "Permissive"
        }
    );
    println!();
    Ok(())
}

fn format_amount(amount: Option<f64>) -> String {
    match amount {
        Some(amount) => format!("${:.2}", amount),
        None => "-".to_string(),
    }
}

/// Truncate a string to max length, adding "..." if truncated
fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
