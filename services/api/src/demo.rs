use crate::infra::{DryRunTransport, InMemorySessionStore};
use clap::Args;
use std::sync::Arc;
use talent_intake::config::AppConfig;
use talent_intake::crm::{flatten, CrmTransport, HubSpotClient, SubmissionPayload};
use talent_intake::error::AppError;
use talent_intake::forms::{
    FieldValue, FormCatalog, FormKind, FormSummary, PrefillSource, SubmissionState,
};
use talent_intake::session::{IntakeService, SessionView};

#[derive(Args, Debug, Default)]
pub(crate) struct FormsArgs {
    /// Print the full step layout of every form as JSON.
    #[arg(long)]
    pub(crate) json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Form to fill in: cohort, network or bench.
    #[arg(long, value_parser = parse_form, default_value = "network")]
    pub(crate) form: FormKind,
    /// Assessment hand-off query string, e.g. `score=82&tier=Advanced&firstName=Dana`.
    #[arg(long, value_parser = parse_prefill)]
    pub(crate) prefill: Option<PrefillSource>,
    /// Post the application to the configured CRM instead of a dry run.
    #[arg(long)]
    pub(crate) live: bool,
}

fn parse_form(raw: &str) -> Result<FormKind, String> {
    FormKind::parse(raw).ok_or_else(|| format!("unknown form '{raw}' (cohort, network, bench)"))
}

fn parse_prefill(raw: &str) -> Result<PrefillSource, String> {
    PrefillSource::from_query(raw).map_err(|err| err.to_string())
}

pub(crate) fn run_form_listing(args: FormsArgs) -> Result<(), AppError> {
    let catalog = FormCatalog::standard()?;

    if args.json {
        let outlines: Vec<_> = FormKind::ALL
            .into_iter()
            .map(|kind| catalog.outline(kind))
            .collect();
        let rendered = serde_json::to_string_pretty(&outlines)
            .map_err(|err| AppError::Io(err.into()))?;
        println!("{rendered}");
        return Ok(());
    }

    println!("Available intake forms");
    for summary in catalog.summaries() {
        render_summary(&summary);
    }
    Ok(())
}

fn render_summary(summary: &FormSummary) {
    println!(
        "\n{} ({}) | {} steps",
        summary.title, summary.slug, summary.total_steps
    );
    println!("  {}", summary.audience);
    println!("  Best for: {}", summary.best_for);
    for highlight in summary.highlights {
        println!("  - {highlight}");
    }
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs {
        form,
        prefill,
        live,
    } = args;

    let config = AppConfig::load()?;
    let catalog = Arc::new(FormCatalog::standard()?);
    let store = Arc::new(InMemorySessionStore::default());
    let prefill = prefill.unwrap_or_default();

    println!("Talent intake demo: {}", form.title());

    if live {
        println!("- mode: live ({})", config.crm.endpoint);
        let transport = Arc::new(HubSpotClient::new(config.crm.clone())?);
        let service = IntakeService::new(store, transport, catalog, config.intake.clone());
        let view = walk_through(&service, form, prefill).await?;
        render_outcome(&view);
        return Ok(());
    }

    println!("- mode: dry run (pass --live to post to the CRM)");
    let transport = DryRunTransport::default();
    let service = IntakeService::new(
        store,
        Arc::new(transport.clone()),
        catalog,
        config.intake.clone(),
    );
    let view = walk_through(&service, form, prefill).await?;
    render_outcome(&view);
    for (_, payload) in transport.delivered() {
        render_payload(&payload);
    }
    Ok(())
}

/// Fill every visible field the script knows about, step by step, then submit.
pub(crate) async fn walk_through<T>(
    service: &IntakeService<InMemorySessionStore, T>,
    form: FormKind,
    prefill: PrefillSource,
) -> Result<SessionView, AppError>
where
    T: CrmTransport + 'static,
{
    let mut view = service.open(form, prefill)?;
    let id = view.session_id;
    let snapshot = &view.snapshot;
    println!("- session {id}");
    if snapshot.from_assessment {
        println!(
            "- arrived from the skills assessment{}{}{}",
            snapshot
                .assessment_tier
                .as_deref()
                .map(|tier| format!(" | tier {tier}"))
                .unwrap_or_default(),
            snapshot
                .assessment_blocker
                .as_deref()
                .map(|blocker| format!(" | blocker {blocker}"))
                .unwrap_or_default(),
            if snapshot.qualified {
                " | qualified for priority review"
            } else {
                ""
            }
        );
    }

    loop {
        println!(
            "\nStep {}/{}: {}",
            view.snapshot.step, view.snapshot.total_steps, view.snapshot.step_title
        );

        while let Some((key, answer)) = next_scripted(&view, form) {
            view = match answer {
                Scripted::Text(text) => service.set_field(&id, key, FieldValue::text(*text))?,
                Scripted::Pick(options) => {
                    for option in options.iter() {
                        view = service.toggle(&id, key, option)?;
                    }
                    view
                }
            };
            if let Some(value) = view.snapshot.answers.get(key) {
                println!("  {key} = {}", flatten(value));
            }
        }

        if view.snapshot.step == view.snapshot.total_steps {
            break;
        }
        view = service.advance(&id)?;
    }

    Ok(service.submit(&id).await?)
}

#[derive(Debug, Clone, Copy)]
enum Scripted {
    Text(&'static str),
    Pick(&'static [&'static str]),
}

/// First visible, unanswered field on the current step with a scripted answer.
fn next_scripted(view: &SessionView, form: FormKind) -> Option<(&'static str, &'static Scripted)> {
    view.snapshot
        .visible_fields
        .iter()
        .filter(|field| {
            !view
                .snapshot
                .answers
                .get(field.key)
                .is_some_and(FieldValue::is_answered)
        })
        .find_map(|field| {
            script(form)
                .iter()
                .find(|(key, _)| *key == field.key)
                .map(|(key, answer)| (*key, answer))
        })
}

fn script(form: FormKind) -> &'static [(&'static str, Scripted)] {
    use Scripted::{Pick, Text};

    match form {
        FormKind::Cohort => &[
            ("firstName", Text("Alex")),
            ("lastName", Text("Johnson")),
            ("email", Text("alex.johnson@university.edu")),
            ("city", Text("Austin, TX")),
            ("school", Text("University of Texas")),
            ("major", Text("Marketing")),
            ("graduationYear", Text("2026")),
            (
                "whySales",
                Text("I like solving problems for people and want to learn a real process."),
            ),
            ("heardFrom", Text("University/Professor")),
        ],
        FormKind::Network => &[
            ("firstName", Text("Jordan")),
            ("lastName", Text("Lee")),
            ("email", Text("jordan.lee@example.com")),
            ("location", Text("Denver, CO")),
            ("yearsExperience", Text("1-3 years")),
            ("currentRole", Text("SDR")),
            ("industries", Pick(&["SaaS / Software", "FinTech / Financial Services"])),
            ("dealSize", Text("$10K - $50K")),
            (
                "workInterests",
                Pick(&["Prospecting / Outbound", "Discovery & Qualification"]),
            ),
            ("lookingFor", Pick(&["Full-time role", "Training & skill development"])),
            ("takenAssessment", Text("Not yet, but I plan to")),
            ("heardFrom", Text("LinkedIn")),
        ],
        FormKind::Bench => &[
            ("firstName", Text("Dana")),
            ("lastName", Text("Reyes")),
            ("email", Text("dana.reyes@example.com")),
            ("yearsExperience", Text("10-15 years")),
            ("currentRole", Text("VP of Sales")),
            ("industries", Pick(&["SaaS / Software"])),
            ("largestDeal", Text("$500K - $1M")),
            ("managedTeam", Text("Yes")),
            ("teamSize", Text("8-15 people")),
            (
                "strengths",
                Pick(&["Negotiation & closing", "Coaching / developing reps"]),
            ),
            (
                "engagementTypes",
                Pick(&["Fractional Sales Leadership", "Deal coaching & strategy"]),
            ),
            ("availability", Text("2-4 weeks")),
            ("hoursPerWeek", Text("10-20 hours")),
            ("desiredRate", Text("$150-200/hr")),
            ("projectPricing", Text("Yes")),
            ("heardFrom", Text("Referral from a friend")),
        ],
    }
}

fn render_outcome(view: &SessionView) {
    match &view.snapshot.submission {
        SubmissionState::Succeeded => println!("\nApplication submitted."),
        SubmissionState::Failed(failure) => println!(
            "\nSubmission failed ({:?}): {}. The answers are kept; retry with POST /submit.",
            failure.kind, failure.detail
        ),
        SubmissionState::InFlight => println!("\nSubmission still in flight."),
        SubmissionState::NotStarted => println!("\nApplication was not submitted."),
    }
}

fn render_payload(payload: &SubmissionPayload) {
    println!(
        "\nPayload for {} ({})",
        payload.context.page_name, payload.context.page_uri
    );
    for field in payload.fields.iter().filter(|field| !field.value.is_empty()) {
        println!("  {} = {}", field.name, field.value);
    }
}
