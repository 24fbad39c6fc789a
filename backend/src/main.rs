//! Run a calling campaign over leads fetched from the backend.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::ffi::OsString;
use std::io;
use std::sync::Arc;

use clap::Parser;
use leadline::config::BackendSettings;
use leadline::domain::data_access::RecordAccess;
use leadline::domain::{CampaignProvider, Filters, LEADS, LeadField, Projection};
use leadline::inbound::campaign_cli::run_campaign_walk;
use leadline::outbound::rest::PostgrestRecordStore;
use ortho_config::OrthoConfig;
use tokio::io::{BufReader, stdin, stdout};
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

/// `lead-campaign` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "lead-campaign",
    about = "Walk a calling campaign over leads stored in the backend",
    version
)]
struct CliArgs {
    /// Campaign identifier.
    #[arg(long = "campaign-id", value_name = "id")]
    campaign_id: String,
    /// Campaign display name.
    #[arg(long = "campaign-name", value_name = "name")]
    campaign_name: String,
    /// Campaign type tag.
    #[arg(long = "campaign-type", value_name = "type", default_value = "cold-call")]
    campaign_type: String,
    /// Only include leads in this city; repeat for several.
    #[arg(long = "city", value_name = "city")]
    cities: Vec<String>,
    /// Only include leads in this district; repeat for several.
    #[arg(long = "district", value_name = "district")]
    districts: Vec<String>,
}

fn main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main(CliArgs::parse()))
}

async fn async_main(args: CliArgs) -> io::Result<()> {
    let settings = BackendSettings::load_from_iter([OsString::from("lead-campaign")])
        .map_err(|error| io::Error::other(format!("load settings: {error}")))?;
    let connection = settings
        .connection()
        .map_err(|error| io::Error::new(io::ErrorKind::InvalidInput, error.to_string()))?;
    let store = PostgrestRecordStore::new(connection)
        .map_err(|error| io::Error::other(format!("create record store: {error}")))?;
    let records = RecordAccess::new(Arc::new(store));

    let filters = lead_filters(&args.cities, &args.districts);
    let leads = records
        .fetch_all(LEADS, &Projection::All, &filters)
        .await
        .into_result()
        .map_err(|error| io::Error::other(format!("fetch leads: {error}")))?;
    info!(campaign = %args.campaign_id, leads = leads.len(), "leads fetched");

    let provider = CampaignProvider::new();
    let campaign = provider.handle();
    campaign.start(
        args.campaign_id,
        args.campaign_name,
        args.campaign_type,
        leads,
    );

    let mut output = stdout();
    run_campaign_walk(BufReader::new(stdin()), &mut output, &campaign).await
}

/// One value filters by equality, several by membership, none not at all.
fn lead_filters(cities: &[String], districts: &[String]) -> Filters {
    [(LeadField::City, cities), (LeadField::District, districts)]
        .into_iter()
        .fold(Filters::new(), |filters, (field, values)| match values {
            [] => filters,
            [single] => filters.eq(field.column(), single.as_str()),
            many => filters.any_of(field.column(), many.iter().map(String::as_str)),
        })
}
