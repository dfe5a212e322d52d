mod config;
mod controller;
mod fallback;
mod storage;
mod sync;
mod transport;

use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::{bail, Context, Result};
use folio_forms::{Field, SubmissionKind};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::ClientConfig;
use crate::controller::{FormState, SubmissionController, SubmitOutcome, Tone};
use crate::fallback::FallbackLog;
use crate::storage::{FileStorage, LocalStorage};
use crate::sync::sync_pending;
use crate::transport::{HttpTransport, SubmissionTransport};

const USAGE: &str = "usage: folio-client <contact|testimonial|list|pending|sync>";

#[tokio::main]
async fn main() -> Result<()> {
    let config = ClientConfig::from_env()?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let transport = HttpTransport::new(config.api_base_url.clone(), config.request_timeout)?;
    let fallback = FallbackLog::new(FileStorage::new(config.store_path.clone()));
    let controller = SubmissionController::new(transport, fallback)
        .on_busy(|form| println!("[{}]", form.submit_label));

    let command = std::env::args().nth(1).unwrap_or_default();
    match command.as_str() {
        "contact" => run_form(&controller, SubmissionKind::Contact).await,
        "testimonial" => run_form(&controller, SubmissionKind::Testimonial).await,
        "list" => print_testimonials(&controller).await,
        "pending" => print_pending(controller.fallback()),
        "sync" => {
            let report = sync_pending(controller.transport(), controller.fallback()).await?;
            println!(
                "Synced {} submission(s); {} still saved locally.",
                report.replayed, report.remaining
            );
            Ok(())
        }
        _ => bail!(USAGE),
    }
}

fn label(kind: SubmissionKind, field: Field) -> &'static str {
    match (kind, field) {
        (SubmissionKind::Testimonial, Field::Message) => "Testimonial",
        (_, Field::Name) => "Name",
        (_, Field::Email) => "Email",
        (_, Field::Subject) => "Subject",
        (_, Field::Message) => "Message",
    }
}

fn prompt(field_label: &str, input: &mut impl BufRead) -> Result<String> {
    print!("{field_label}: ");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        bail!("input closed before the form was complete");
    }
    Ok(line)
}

/// Terminal rendition of the web form: prompt every field, then re-prompt
/// only the fields that failed validation until the draft is accepted.
async fn run_form<T, S>(
    controller: &SubmissionController<T, S>,
    kind: SubmissionKind,
) -> Result<()>
where
    T: SubmissionTransport,
    S: LocalStorage,
{
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut form = FormState::new(kind);
    let mut pending: Vec<Field> = kind.fields().to_vec();

    loop {
        for field in &pending {
            let value = prompt(label(kind, *field), &mut input)?;
            form.edit(*field, value);
        }

        let outcome = controller.submit(&mut form).await;

        if let Some(banner) = form.visible_banner(Instant::now()) {
            match banner.tone {
                Tone::Success => println!("{}", banner.text),
                Tone::Error => eprintln!("{}", banner.text),
            }
        }

        match outcome {
            SubmitOutcome::Invalid => {
                for (field, message) in form.errors.iter() {
                    eprintln!("  {}: {message}", label(kind, field));
                }
                pending = form.errors.fields().collect();
            }
            SubmitOutcome::Submitted { refresh_list }
            | SubmitOutcome::SavedLocally { refresh_list, .. } => {
                if refresh_list {
                    print_testimonials(controller).await?;
                }
                return Ok(());
            }
            SubmitOutcome::Failed => bail!("submission could not be saved"),
        }
    }
}

async fn print_testimonials<T, S>(controller: &SubmissionController<T, S>) -> Result<()>
where
    T: SubmissionTransport,
    S: LocalStorage,
{
    match controller.transport().fetch_testimonials().await {
        Ok(listed) if listed.is_empty() => println!("No testimonials yet."),
        Ok(listed) => {
            for t in listed {
                println!(
                    "\"{}\"\n  - {} ({})",
                    t.message,
                    t.name,
                    t.date_created.format("%B %-d, %Y")
                );
            }
        }
        Err(e) => eprintln!("Could not load testimonials: {e}"),
    }

    let local = controller
        .fallback()
        .entries(SubmissionKind::Testimonial)
        .context("reading local testimonials")?;
    if !local.is_empty() {
        println!("\nSaved locally ({}):", local.len());
        for t in local {
            println!("\"{}\"\n  - {}", t.message, t.name);
        }
    }
    Ok(())
}

fn print_pending<S: LocalStorage>(log: &FallbackLog<S>) -> Result<()> {
    for kind in [SubmissionKind::Contact, SubmissionKind::Testimonial] {
        let entries = log.entries(kind)?;
        println!("{} ({}):", kind.storage_key(), entries.len());
        for e in entries {
            println!("  #{} {} <{}> {}", e.id, e.name, e.email, e.date_created.to_rfc3339());
        }
    }
    Ok(())
}
