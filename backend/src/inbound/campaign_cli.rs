//! Terminal driver for a running campaign.
//!
//! Reads one command per line, applies it to the shared
//! [`CampaignHandle`], and renders the current lead after every move.

use std::fmt;
use std::str::FromStr;

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::domain::{CampaignHandle, Lead, LeadField};

const HINT: &str = "commands: n(ext), p(rev), q(uit)";

/// Navigation command typed by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CampaignCommand {
    /// Advance to the next lead.
    Next,
    /// Go back to the previous lead.
    Previous,
    /// Leave the campaign.
    Exit,
}

/// Input that is not a known command.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown command '{0}'")]
pub struct UnknownCommand(pub String);

impl FromStr for CampaignCommand {
    type Err = UnknownCommand;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input.trim().to_ascii_lowercase().as_str() {
            "n" | "next" => Ok(Self::Next),
            "p" | "prev" | "previous" => Ok(Self::Previous),
            "q" | "quit" | "exit" => Ok(Self::Exit),
            _ => Err(UnknownCommand(input.trim().to_owned())),
        }
    }
}

/// Walk the campaign held by `campaign` until the operator exits or input ends.
///
/// The campaign is exited on return either way.
///
/// # Errors
///
/// Returns any I/O error raised by `reader` or `writer`.
pub async fn run_campaign_walk<R, W>(
    mut reader: R,
    writer: &mut W,
    campaign: &CampaignHandle,
) -> std::io::Result<()>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    writer.write_all(render_header(campaign).as_bytes()).await?;
    writer.write_all(render_current(campaign).as_bytes()).await?;
    writer.flush().await?;

    let mut line = String::new();
    loop {
        line.clear();
        if reader.read_line(&mut line).await? == 0 {
            debug!("campaign input closed");
            break;
        }
        if line.trim().is_empty() {
            continue;
        }
        let output = match line.parse::<CampaignCommand>() {
            Ok(CampaignCommand::Exit) => break,
            Ok(CampaignCommand::Next) => step(campaign, CampaignCommand::Next),
            Ok(CampaignCommand::Previous) => step(campaign, CampaignCommand::Previous),
            Err(error) => format!("{error}; {HINT}\n"),
        };
        writer.write_all(output.as_bytes()).await?;
        writer.flush().await?;
    }

    campaign.exit();
    writer.write_all(b"campaign closed\n").await?;
    writer.flush().await
}

fn step(campaign: &CampaignHandle, command: CampaignCommand) -> String {
    let at_edge = campaign.read(|store| match command {
        CampaignCommand::Next => store.is_last(),
        _ => store.is_first(),
    });
    if at_edge {
        let edge = if command == CampaignCommand::Next {
            "last"
        } else {
            "first"
        };
        return format!("already at the {edge} lead\n");
    }
    match command {
        CampaignCommand::Next => campaign.next(),
        _ => campaign.previous(),
    }
    render_current(campaign)
}

fn render_header(campaign: &CampaignHandle) -> String {
    campaign.read(|store| match store.campaign() {
        Some(info) => format!(
            "campaign {} ({}): {} leads\n",
            info.name,
            info.kind,
            store.len()
        ),
        None => "no campaign is running\n".to_owned(),
    })
}

fn render_current(campaign: &CampaignHandle) -> String {
    campaign.read(|store| match (store.current(), store.progress()) {
        (Some(lead), Some(progress)) => {
            format!("[{} of {}] {}\n", progress.current, progress.total, LeadLine(lead))
        }
        _ => "no leads to call\n".to_owned(),
    })
}

/// One-line lead summary; blank attributes are left out.
struct LeadLine<'a>(&'a Lead);

impl fmt::Display for LeadLine<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0.id)?;
        for field in LeadField::ALL {
            if let Some(value) = self.0.field(field).filter(|value| !value.trim().is_empty()) {
                write!(f, " | {value}")?;
            }
        }
        Ok(())
    }
}
