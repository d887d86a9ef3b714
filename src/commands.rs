use crate::cli::{
    Commands, GenerateArgs, GenerateSource, JoinArgs, MediaCommands, NotificationCommands,
    OrderCommands, ProfileCommands, QuizCommands,
};
use anyhow::{bail, Context};
use quizcraft::dto::auth_dto::{
    ForgotPasswordPayload, LoginPayload, ResetPasswordPayload, SignupPayload, UpdateProfilePayload,
};
use quizcraft::dto::generation_dto::GenerationSource;
use quizcraft::dto::order_dto::ValidateOrderPayload;
use quizcraft::models::quiz::QuizDraft;
use quizcraft::realtime::join_flow::{FollowEvent, JoinState};
use quizcraft::services::export_service::ExportService;
use quizcraft::services::results_service::{summarize, SCORE_BUCKETS};
use quizcraft::store::SessionStore;
use quizcraft::utils::time;
use quizcraft::wizard::{CreationMode, QuizWizard, WizardStep};
use quizcraft::QuizClient;
use serde::Serialize;
use std::path::Path;
use tracing::{info, warn};

pub async fn dispatch(
    command: Commands,
    client: &QuizClient,
    mut store: SessionStore,
    json: bool,
) -> anyhow::Result<()> {
    match command {
        Commands::Signup(args) => {
            let session = client
                .auth_service
                .signup(&SignupPayload {
                    name: args.name.trim().to_string(),
                    email: args.email.trim().to_string(),
                    password: args.password,
                })
                .await?;
            println!("Welcome, {}!", session.user.name);
            store.save(session).await?;
        }
        Commands::Login(args) => {
            let session = client
                .auth_service
                .login(&LoginPayload {
                    email: args.email.trim().to_string(),
                    password: args.password,
                })
                .await?;
            println!("Signed in as {} <{}>", session.user.name, session.user.email);
            store.save(session).await?;
        }
        Commands::Logout => {
            if store.current().is_some() {
                if let Err(err) = client.auth_service.logout().await {
                    warn!(error = %err, "server logout failed; clearing local session anyway");
                }
            }
            store.clear().await?;
            println!("Signed out.");
        }
        Commands::Whoami => {
            require_login(&store)?;
            let user = client.auth_service.me().await?;
            if json {
                return print_json(&user);
            }
            println!("{} <{}>", user.name, user.email);
            if let Some(plan) = user.plan {
                println!("Plan: {plan}");
            }
        }
        Commands::ForgotPassword { email } => {
            let message = client
                .auth_service
                .forgot_password(&ForgotPasswordPayload {
                    email: email.trim().to_string(),
                })
                .await?;
            println!("{}", or_default(message, "Check your inbox for a reset link."));
        }
        Commands::ResetPassword { token, password } => {
            let message = client
                .auth_service
                .reset_password(token.trim(), &ResetPasswordPayload { password })
                .await?;
            println!("{}", or_default(message, "Password updated. You can sign in now."));
        }
        Commands::Validate { draft } => validate_draft(&draft).await?,
        Commands::Create { draft } => {
            require_login(&store)?;
            create_quiz(client, &draft, json).await?
        }
        Commands::Generate(args) => {
            require_login(&store)?;
            generate(client, args).await?
        }
        Commands::Quizzes { action } => {
            require_login(&store)?;
            quizzes(client, action, json).await?
        }
        Commands::Join(args) => join(client, args).await?,
        Commands::Results { code, export } => {
            let results = client.session_service.results(code.trim()).await?;
            if json {
                print_json(&results)?;
            } else {
                print_results(&summarize(&results));
            }
            if let Some(path) = export {
                let bytes = ExportService::generate_results_xlsx(&summarize(&results))?;
                tokio::fs::write(&path, bytes)
                    .await
                    .with_context(|| format!("failed to write {}", path.display()))?;
                println!("Results exported to {}", path.display());
            }
        }
        Commands::Notifications { action } => {
            require_login(&store)?;
            notifications(client, action, json).await?
        }
        Commands::Dashboard => {
            require_login(&store)?;
            let data = client.dashboard_service.load().await?;
            if json {
                return print_json(&data);
            }
            println!("Quizzes:      {}", data.total_quizzes);
            println!("Sessions:     {}", data.total_sessions);
            println!("Participants: {}", data.total_participants);
            if let Some(avg) = data.average_score {
                println!("Avg score:    {avg:.1}%");
            }
            if !data.recent_quizzes.is_empty() {
                println!("\nRecent quizzes:");
                let now = time::now();
                for quiz in &data.recent_quizzes {
                    let when = quiz
                        .created_at
                        .map(|dt| time::relative(dt, now))
                        .unwrap_or_default();
                    println!("  {}  {}  {}", quiz.id, quiz.title, when);
                }
            }
        }
        Commands::Media { action } => media(client, action, json).await?,
        Commands::Order { action } => {
            require_login(&store)?;
            order(client, action, json).await?
        }
        Commands::Profile { action } => {
            require_login(&store)?;
            profile(client, &mut store, action, json).await?
        }
    }
    Ok(())
}

fn require_login(store: &SessionStore) -> anyhow::Result<()> {
    if store.active_token().is_none() {
        bail!("You are not signed in. Run `quizcraft login` first.");
    }
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_default(message: String, fallback: &str) -> String {
    if message.trim().is_empty() {
        fallback.to_string()
    } else {
        message
    }
}

async fn read_draft(path: &Path) -> anyhow::Result<QuizDraft> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read draft {}", path.display()))?;
    serde_json::from_slice(&bytes)
        .with_context(|| format!("{} is not a valid quiz draft", path.display()))
}

/// Runs the draft through each wizard step in order, stopping at the first gate that fails.
async fn validate_draft(path: &Path) -> anyhow::Result<()> {
    let draft = read_draft(path).await?;
    let mut wizard = QuizWizard::with_draft(CreationMode::Manual, draft);
    loop {
        let step = wizard.step();
        match wizard.next_step() {
            Ok(next) => {
                println!("ok    {}", step.title());
                if next == WizardStep::Publish {
                    break;
                }
            }
            Err(err) => {
                println!("fail  {}", step.title());
                return Err(err.into());
            }
        }
    }
    wizard.ensure_ready()?;
    println!(
        "Draft is ready to publish ({} questions).",
        wizard.draft().questions.len()
    );
    Ok(())
}

async fn create_quiz(client: &QuizClient, path: &Path, json: bool) -> anyhow::Result<()> {
    let draft = read_draft(path).await?;
    let mut wizard = QuizWizard::with_draft(CreationMode::Manual, draft);
    let quiz = wizard
        .submit(&client.quiz_service, client.config.max_upload_bytes())
        .await?;
    if json {
        return print_json(&quiz);
    }
    println!(
        "Published \"{}\" ({} questions), id {}",
        quiz.title,
        quiz.total_questions(),
        quiz.id
    );
    Ok(())
}

fn generation_source(source: GenerateSource) -> anyhow::Result<GenerationSource> {
    Ok(match source {
        GenerateSource { pdf: Some(p), .. } => GenerationSource::Pdf(p),
        GenerateSource { image: Some(p), .. } => GenerationSource::Image(p),
        GenerateSource { text: Some(t), .. } => GenerationSource::Text(t),
        GenerateSource { url: Some(u), .. } => GenerationSource::Url(u),
        _ => bail!("choose one of --pdf, --image, --text or --url"),
    })
}

async fn generate(client: &QuizClient, args: GenerateArgs) -> anyhow::Result<()> {
    let source = generation_source(args.source)?;
    let draft = if tokio::fs::try_exists(&args.out).await.unwrap_or(false) {
        read_draft(&args.out).await?
    } else {
        QuizDraft {
            difficulty: args.difficulty,
            ..QuizDraft::default()
        }
    };

    let generated = client
        .generation_service
        .generate(&source, args.count, args.difficulty)
        .await?;
    let added = generated.questions.len();

    let mut wizard = QuizWizard::with_draft(CreationMode::Ai(source), draft);
    wizard.apply_generated(generated);

    let bytes = serde_json::to_vec_pretty(wizard.draft())?;
    tokio::fs::write(&args.out, bytes)
        .await
        .with_context(|| format!("failed to write {}", args.out.display()))?;
    info!(path = %args.out.display(), added, "draft written");
    println!(
        "Added {} questions to {} (now {}). Review it, then run `quizcraft create {}`.",
        added,
        args.out.display(),
        wizard.draft().questions.len(),
        args.out.display()
    );
    Ok(())
}

async fn quizzes(client: &QuizClient, action: QuizCommands, json: bool) -> anyhow::Result<()> {
    match action {
        QuizCommands::List { page, per_page } => {
            let list = client.quiz_service.list_quizzes(page, per_page).await?;
            if json {
                return print_json(&list);
            }
            if list.items.is_empty() {
                println!("No quizzes yet.");
            }
            for quiz in &list.items {
                println!(
                    "{}  {}  [{}] {} questions",
                    quiz.id,
                    quiz.title,
                    quiz.subject.as_deref().unwrap_or("-"),
                    quiz.total_questions()
                );
            }
            if list.total > 0 {
                println!("Page {} of {} quizzes", list.page.max(1), list.total);
            }
        }
        QuizCommands::Show { id } => {
            let quiz = client.quiz_service.get_quiz(&id).await?;
            if json {
                return print_json(&quiz);
            }
            println!("{}", quiz.title);
            if let Some(desc) = quiz.description.as_deref().filter(|d| !d.is_empty()) {
                println!("{desc}");
            }
            println!("Questions: {}", quiz.total_questions());
            for (idx, question) in quiz.questions.iter().enumerate() {
                let text = question
                    .get("question")
                    .and_then(|q| q.as_str())
                    .unwrap_or("(untitled)");
                println!("  {}. {}", idx + 1, text);
            }
        }
        QuizCommands::Delete { id } => {
            client.quiz_service.delete_quiz(&id).await?;
            println!("Deleted quiz {id}.");
        }
    }
    Ok(())
}

/// Joins a session and prints every state change until the session ends or Ctrl-C.
async fn join(client: &QuizClient, args: JoinArgs) -> anyhow::Result<()> {
    let mut flow = client.join_flow();
    flow.connect().await?;

    let state = flow.submit_code(&args.code).await?.clone();
    if let JoinState::Rejected { reason } = &state {
        flow.disconnect().await?;
        bail!("{reason}");
    }
    if let JoinState::AwaitingName {
        quiz_title: Some(title),
        ..
    } = &state
    {
        println!("Joining \"{title}\"");
    }

    flow.submit_name(&args.name)?;
    let state = flow.confirm_join().await?.clone();
    if let JoinState::Rejected { reason } = &state {
        flow.disconnect().await?;
        bail!("{reason}");
    }

    println!("Once the session starts, answer with `<question-index> <answer>`, e.g. `0 2`.");
    let answers = tokio::io::BufReader::new(tokio::io::stdin());
    let followed = tokio::select! {
        res = flow.follow(answers, print_follow_event) => res,
        _ = tokio::signal::ctrl_c() => {
            println!("Leaving session.");
            Ok(())
        }
    };
    if flow.state() == &JoinState::Disconnected {
        warn!(code = %args.code, "session channel closed before the session ended");
    }
    flow.disconnect().await?;
    followed?;
    Ok(())
}

fn print_follow_event(event: FollowEvent) {
    match event {
        FollowEvent::State(state) => print_join_state(&state),
        FollowEvent::Notice(message) => println!("Notice: {message}"),
        FollowEvent::AnswerSent { question_index } => {
            println!("Answer to question {question_index} sent.")
        }
        FollowEvent::BadInput(message) => println!("{message}"),
    }
}

fn print_join_state(state: &JoinState) {
    match state {
        JoinState::Lobby(view) => println!(
            "Waiting in lobby for {} ({} joined)",
            view.code,
            view.participants.len()
        ),
        JoinState::InProgress(view) => println!("Session {} has started.", view.code),
        JoinState::Completed(view) => println!(
            "Session {} is over. Run `quizcraft results {}` to see the scores.",
            view.code, view.code
        ),
        other => println!("{}", other.label()),
    }
}

fn print_results(summary: &quizcraft::services::results_service::ResultsSummary) {
    if let Some(title) = &summary.quiz_title {
        println!("{title} ({})", summary.code);
    } else {
        println!("Session {}", summary.code);
    }
    if summary.leaderboard.is_empty() {
        println!("Nobody took part.");
        return;
    }
    for entry in &summary.leaderboard {
        println!(
            "{:>3}. {:<30} {:>5} pts {:>6.1}%",
            entry.rank, entry.result.name, entry.result.score, entry.percentage
        );
    }
    println!(
        "\nAverage {:.1}%  Highest {:.1}%  Lowest {:.1}%",
        summary.average_percentage, summary.highest_percentage, summary.lowest_percentage
    );
    for (label, count) in SCORE_BUCKETS.iter().zip(summary.distribution) {
        println!("{label:>8} {}", "#".repeat(count));
    }
}

async fn notifications(
    client: &QuizClient,
    action: NotificationCommands,
    json: bool,
) -> anyhow::Result<()> {
    let service = &client.notification_service;
    match action {
        NotificationCommands::List => {
            let items = service.list().await?;
            if json {
                return print_json(&items);
            }
            if items.is_empty() {
                println!("No notifications.");
            }
            let now = time::now();
            for n in &items {
                let marker = if n.read { " " } else { "*" };
                println!(
                    "{marker} {}  {}  {}",
                    n.id,
                    n.title,
                    time::relative(n.created_at, now)
                );
                if !n.message.is_empty() {
                    println!("    {}", n.message);
                }
            }
        }
        NotificationCommands::Read { id } => {
            service.mark_read(&id).await?;
            println!("Marked {id} as read.");
        }
        NotificationCommands::ReadAll => {
            service.mark_all_read().await?;
            println!("All notifications marked as read.");
        }
        NotificationCommands::Delete { id } => {
            service.delete(&id).await?;
            println!("Deleted notification {id}.");
        }
    }
    Ok(())
}

async fn media(client: &QuizClient, action: MediaCommands, json: bool) -> anyhow::Result<()> {
    let hits = match action {
        MediaCommands::Images { query, limit } => {
            client.media_service.search_images(&query, limit).await?
        }
        MediaCommands::Gifs { query, limit } => {
            client.media_service.search_gifs(&query, limit).await?
        }
    };
    if json {
        return print_json(&hits);
    }
    if hits.is_empty() {
        println!("Nothing found.");
    }
    for hit in &hits {
        if hit.title.is_empty() {
            println!("{}", hit.url);
        } else {
            println!("{}  {}", hit.url, hit.title);
        }
    }
    Ok(())
}

async fn order(client: &QuizClient, action: OrderCommands, json: bool) -> anyhow::Result<()> {
    match action {
        OrderCommands::Create { plan } => {
            let order = client.order_service.create_order(plan).await?;
            if json {
                return print_json(&order);
            }
            println!(
                "Order {} opened for {} {}",
                order.id, order.amount, order.currency
            );
        }
        OrderCommands::Validate {
            order_id,
            payment_id,
            signature,
        } => {
            let result = client
                .order_service
                .validate_payment(&ValidateOrderPayload {
                    order_id,
                    payment_id,
                    signature,
                })
                .await?;
            if json {
                return print_json(&result);
            }
            println!(
                "{}",
                result
                    .message
                    .unwrap_or_else(|| "Payment confirmed.".to_string())
            );
        }
    }
    Ok(())
}

async fn profile(
    client: &QuizClient,
    store: &mut SessionStore,
    action: ProfileCommands,
    json: bool,
) -> anyhow::Result<()> {
    match action {
        ProfileCommands::Activity => {
            let entries = client.user_service.activity().await?;
            if json {
                return print_json(&entries);
            }
            if entries.is_empty() {
                println!("No activity yet.");
            }
            let now = time::now();
            for entry in &entries {
                println!(
                    "{:>10}  {}  {}",
                    time::relative(entry.created_at, now),
                    entry.action,
                    entry.detail.as_deref().unwrap_or("")
                );
            }
        }
        ProfileCommands::Update {
            name,
            email,
            avatar,
        } => {
            let trim = |v: Option<String>| {
                v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
            };
            let payload = UpdateProfilePayload {
                name: trim(name),
                email: trim(email),
                avatar: trim(avatar),
            };
            if payload.name.is_none() && payload.email.is_none() && payload.avatar.is_none() {
                bail!("Nothing to update. Pass --name, --email or --avatar.");
            }
            let user = client.user_service.update_profile(&payload).await?;
            if let Some(mut session) = store.current().cloned() {
                session.user = user.clone();
                store.save(session).await?;
            }
            if json {
                return print_json(&user);
            }
            println!("Profile updated: {} <{}>", user.name, user.email);
        }
    }
    Ok(())
}
