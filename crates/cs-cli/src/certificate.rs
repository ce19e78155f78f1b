//! # Certificate Subcommand
//!
//! Runs the certificate wizard headlessly from command-line flags, submits
//! the request, then downloads the rendered certificate in each requested
//! language.
//!
//! The flags map onto the wizard steps: `--relation`, `--end-date`,
//! `--hours-per-week`, `--subject`, `--medium` and `--ongoing` fill the
//! information step; `--activity` fills the activity step. Validation is
//! the wizard's own, so a rejected flag reports the same problem the dialog
//! would.

use std::path::PathBuf;

use anyhow::{anyhow, Context, Result};
use clap::Args;

use cs_api_client::ApiClient;
use cs_core::{CommunicationMedium, LanguageCode, RelationId, Timestamp};
use cs_state::{CertificateSession, Wizard, WizardContext};

use crate::sink::FileSink;

/// Arguments for the `cs certificate` subcommand.
#[derive(Args, Debug)]
pub struct CertificateArgs {
    /// Match the certificate is issued for.
    #[arg(long)]
    pub relation: String,

    /// End of the certificate period (YYYY-MM-DD or RFC 3339). Defaults to now.
    #[arg(long)]
    pub end_date: Option<String>,

    /// Weekly hours, a multiple of 0.25 between 0.25 and 40.
    #[arg(long, default_value_t = 1.0)]
    pub hours_per_week: f64,

    /// Subject covered. Repeat for several.
    #[arg(long = "subject")]
    pub subjects: Vec<String>,

    /// How sessions were held (video, email, phone, chat).
    #[arg(long)]
    pub medium: CommunicationMedium,

    /// Activity description. Repeat for several.
    #[arg(long = "activity")]
    pub activities: Vec<String>,

    /// The tutoring is still ongoing.
    #[arg(long)]
    pub ongoing: bool,

    /// Document language. Repeat to download several versions, each saved
    /// under `<out>/<code>/`.
    #[arg(long = "lang", default_value = "de")]
    pub languages: Vec<LanguageCode>,

    /// Directory the certificate is saved to.
    #[arg(long, default_value = ".")]
    pub out: PathBuf,
}

/// Execute the certificate subcommand.
pub async fn run_certificate(args: &CertificateArgs, client: &ApiClient) -> Result<u8> {
    let user = client
        .current_user()
        .await
        .context("failed to load the current user")?;

    let mut session = CertificateSession::new();
    let wizard = session.open(WizardContext::with_system_clock(user))?;
    fill_wizard(wizard, args)?;

    let id = session.submit(client).await?;
    println!("OK: created certificate {id}");

    let mut sink = output_sink(args);
    for language in &args.languages {
        let stage = session
            .download_mut()
            .ok_or_else(|| anyhow!("certificate stage missing after creation"))?;
        stage.set_language(*language)?;
        session.fetch_document(client, &mut sink).await?;
        if let Some(path) = sink.saved().last() {
            println!("OK: saved {} ({})", path.display(), language.display_name());
        }
    }
    Ok(0)
}

/// One language goes to `<out>/certificate.pdf`; several go to
/// `<out>/<code>/certificate.pdf` so none overwrites another.
pub fn output_sink(args: &CertificateArgs) -> FileSink {
    let mut distinct = args.languages.clone();
    distinct.dedup();
    if distinct.len() > 1 {
        FileSink::per_language(&args.out)
    } else {
        FileSink::new(&args.out)
    }
}

/// Drive `wizard` from the introduction to the mode step.
pub fn fill_wizard(wizard: &mut Wizard, args: &CertificateArgs) -> Result<()> {
    wizard.advance_introduction()?;

    let relation = RelationId::new(args.relation.as_str())?;
    wizard
        .select_relation(relation)
        .with_context(|| format!("cannot select relation {}", args.relation))?;
    if let Some(raw) = &args.end_date {
        let end = Timestamp::parse(raw)?;
        wizard
            .set_period_end(end)
            .with_context(|| format!("cannot use end date {raw}"))?;
    }
    wizard.set_hours_per_week(args.hours_per_week)?;
    wizard.set_subjects(args.subjects.clone())?;
    wizard.set_medium(args.medium)?;
    wizard.set_ongoing(args.ongoing)?;
    wizard.advance_information()?;

    for activity in &args.activities {
        wizard.add_activity(activity)?;
    }
    wizard.advance_activity()?;

    let draft = wizard.draft();
    tracing::info!(
        weeks = draft.week_count(),
        hours_total = draft.hours_total(),
        "certificate request composed"
    );
    Ok(())
}
