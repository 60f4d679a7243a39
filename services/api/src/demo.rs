use crate::cli::SessionCommand;
use crate::infra::{file_store, mounted_dashboard};
use clap::Args;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use talent_rank::config::AppConfig;
use talent_rank::error::AppError;
use talent_rank::ranking::{
    stat_cards, ApplicantDetailView, ApplicantStatus, DashboardController, DashboardView,
    MemorySessionStore, Notice, RankingResult, SessionStore, SortKey, StatusFilter,
    UploadRequest,
};

const TOP_APPLICANTS: usize = 5;

#[derive(Args, Debug)]
pub(crate) struct RankArgs {
    /// Applicant file to analyze (.csv or .json)
    #[arg(long)]
    pub(crate) file: PathBuf,
    /// Target role for the analysis (defaults to the general pool)
    #[arg(long)]
    pub(crate) role: Option<String>,
    /// Seed for reproducible mock scoring
    #[arg(long)]
    pub(crate) seed: Option<u64>,
    /// Write the ranking CSV to this file or directory
    #[arg(long)]
    pub(crate) export: Option<PathBuf>,
    /// Print every ranked applicant instead of the top five
    #[arg(long)]
    pub(crate) list: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct ExportArgs {
    /// Destination file or directory; prints to stdout when omitted
    #[arg(long)]
    pub(crate) out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Seed for reproducible mock scoring
    #[arg(long)]
    pub(crate) seed: Option<u64>,
}

pub(crate) async fn run_rank(args: RankArgs) -> Result<(), AppError> {
    let RankArgs {
        file,
        role,
        seed,
        export,
        list,
    } = args;

    if !file.is_file() {
        return Err(AppError::Io(io::Error::new(
            io::ErrorKind::NotFound,
            format!("applicant file not found: {}", file.display()),
        )));
    }

    let mut config = AppConfig::load()?;
    if seed.is_some() {
        config.dashboard.seed = seed;
    }

    let store = file_store(&config);
    let mut controller = DashboardController::new(store.clone(), config.dashboard.clone());
    let file_name = file
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    println!("Analyzing {} ...", file.display());
    let result = controller
        .upload(UploadRequest::new(file_name, role))
        .await?;
    render_ranking_summary(result, list);

    if let Some(path) = export {
        talent_rank::ranking::write_csv(&path, &result.ranked_applicants)?;
        println!("\nExported ranking to {}", path.display());
    }

    println!("Session saved to {}", store.path().display());
    Ok(())
}

pub(crate) fn run_session(command: SessionCommand) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let mut controller = mounted_dashboard(file_store(&config), &config);

    match command {
        SessionCommand::Show => match controller.result() {
            Some(result) => render_ranking_summary(result, false),
            None => println!("No saved session."),
        },
        SessionCommand::Clear => {
            controller.clear()?;
            println!("Session cleared.");
        }
    }

    Ok(())
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    let store = file_store(&config);
    let Some(result) = store.load()? else {
        println!("No saved session to export.");
        return Ok(());
    };

    match args.out {
        Some(path) => {
            talent_rank::ranking::write_csv(&path, &result.ranked_applicants)?;
            println!(
                "Exported {} applicants to {}",
                result.ranked_applicants.len(),
                path.display()
            );
        }
        None => println!("{}", talent_rank::ranking::to_csv(&result.ranked_applicants)?),
    }

    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;
    if args.seed.is_some() {
        config.dashboard.seed = args.seed;
    }

    println!("Applicant ranking demo (in-memory session)");
    let store = Arc::new(MemorySessionStore::default());
    let mut controller = DashboardController::new(store, config.dashboard.clone());

    let rejected = controller
        .upload(UploadRequest::new("resume.docx", None))
        .await;
    if let Err(err) = rejected {
        println!("Unsupported upload rejected: {}", err);
    }

    let result = controller
        .upload(UploadRequest::new(
            "demo_applicants.csv",
            Some("Data Scientist".to_string()),
        ))
        .await?;
    render_ranking_summary(result, false);
    print_notice(controller.notification());

    controller.set_status_filter(StatusFilter::Only(ApplicantStatus::ForReview));
    controller.select_sort(SortKey::Score);
    controller.select_sort(SortKey::Score);
    if let Some(projection) = controller.projection() {
        println!(
            "\nFlagged for review, highest score first ({} of {} rows)",
            projection.rows.len(),
            projection.total_rows
        );
        for applicant in projection.rows.iter().take(3) {
            println!(
                "- #{} {} score {}",
                applicant.rank, applicant.name, applicant.score
            );
        }
        if let Some(message) = projection.empty_message {
            println!("- {}", message);
        }
    }

    controller.set_status_filter(StatusFilter::All);
    controller.set_search("python");
    let matches = controller
        .projection()
        .map(|projection| projection.rows.len())
        .unwrap_or_default();
    println!("\nSearch 'python' matched {} applicants", matches);
    controller.set_search("");

    let top = controller
        .result()
        .and_then(|result| result.ranked_applicants.first())
        .map(|applicant| applicant.id.clone());
    if let Some(id) = top {
        controller.select_applicant(&id);
        if let Some(details) = controller.selected_details() {
            render_applicant_details(&details);
        }
        controller.close_details();
    }

    controller.set_view(DashboardView::Validation);
    println!("\nSwitched to the {} tab", controller.view());

    let csv = controller.export_csv()?;
    println!(
        "\nCSV export: {} data rows (header: {})",
        csv.lines().count().saturating_sub(1),
        csv.lines().next().unwrap_or_default()
    );

    controller.save()?;
    print_notice(controller.notification());
    controller.clear()?;
    print_notice(controller.notification());

    Ok(())
}

pub(crate) fn render_ranking_summary(result: &RankingResult, list_all: bool) {
    println!("\nRanking results for {}", result.target_role);
    for card in stat_cards(&result.stats) {
        println!("- {}: {}", card.title, card.value);
    }

    let shown = if list_all {
        result.ranked_applicants.len()
    } else {
        TOP_APPLICANTS
    };
    println!("\nRanked applicants");
    for applicant in result.ranked_applicants.iter().take(shown) {
        println!(
            "{:>4}. {} <{}> score {} [{}] skills: {}",
            applicant.rank,
            applicant.name,
            applicant.email,
            applicant.score,
            applicant.status.label(),
            applicant.skills.join(", ")
        );
    }
    let hidden = result.ranked_applicants.len().saturating_sub(shown);
    if hidden > 0 {
        println!("  ... {} more (use --list to show all)", hidden);
    }

    if result.validation_errors.is_empty() {
        println!("\nValidation log: clean");
    } else {
        println!("\nValidation log");
        for line in &result.validation_errors {
            println!("- {}", line);
        }
    }

    let highlights = result.bias_report.highlights();
    println!("\nBias & fairness");
    if let (Some(gender), Some(share)) = (&highlights.top_gender, highlights.top_gender_share_pct)
    {
        println!("- Largest gender group: {} ({:.1}%)", gender, share);
    }
    if let Some(region) = &highlights.top_region {
        println!("- Most represented region: {}", region);
    }
    for entry in &result.bias_report.education {
        println!("  - {}: {}", entry.name, entry.value);
    }
}

fn render_applicant_details(details: &ApplicantDetailView<'_>) {
    let applicant = details.applicant;
    println!("\nApplicant details: {}", applicant.name);
    println!(
        "- {} | {} | {} | {}",
        applicant.email, applicant.phone, applicant.experience_summary, applicant.education
    );
    println!("- Status: {}", details.status_label);
    println!("Score breakdown ({} total)", applicant.score);
    for component in &details.breakdown {
        println!("  - {}: {}", component.name, component.value);
    }
    println!("Resume summary: {}", applicant.resume_summary);
}

fn print_notice(notice: Option<Notice>) {
    if let Some(notice) = notice {
        println!("\n[notice] {}", notice.message);
    }
}
