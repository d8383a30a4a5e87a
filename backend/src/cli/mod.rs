//! Command-line surface: argument parsing and dispatch to the services.
//!
//! Every command prints its result as JSON on stdout. Failures are rendered
//! as a domain [`Error`] payload on stderr.

mod wiring;

use backend::config::{MeetsyncSettings, SettingsError};
use backend::domain::ports::RepositoryError;
use backend::domain::{
    Error, HangoutId, InviteResponse, LocationDetails, RecommendationId, TimeOptionId, TimeWindow,
    UserId,
};
use backend::outbound::persistence::{PoolError, run_pending_migrations};
use clap::{Parser, Subcommand, ValueEnum};
use serde_json::{Value, json};
use tracing::info;

pub use wiring::{Services, connect};

/// Failures raised before or while running a command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to load configuration: {0}")]
    Config(String),
    #[error(transparent)]
    Settings(#[from] SettingsError),
    #[error(transparent)]
    Pool(#[from] PoolError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
    #[error(transparent)]
    Migration(#[from] RepositoryError),
    #[error(transparent)]
    Domain(#[from] Error),
    #[error("failed to encode output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Render as the domain error payload printed on stderr.
    pub fn into_domain(self) -> Error {
        match self {
            Self::Domain(error) => error,
            Self::Config(_) | Self::Settings(_) => Error::invalid_request(self.to_string()),
            Self::Pool(_) | Self::Migration(RepositoryError::Connection { .. }) => {
                Error::service_unavailable(self.to_string())
            }
            Self::Client(_) | Self::Migration(_) | Self::Output(_) => {
                Error::internal(self.to_string())
            }
        }
    }
}

#[derive(Debug, Parser)]
#[command(
    name = "meetsync",
    version,
    about = "Plan group hangouts: invites, a time poll, and a meetup place everyone can reach"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Apply pending database migrations.
    Migrate,
    #[command(flatten)]
    Hangout(HangoutCommand),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Answer {
    Accept,
    Decline,
}

#[derive(Debug, Subcommand)]
pub enum HangoutCommand {
    /// Create a hangout and invite participants.
    Create {
        #[arg(long)]
        creator: UserId,
        /// Name shown in the invitation.
        #[arg(long)]
        creator_name: String,
        #[arg(long)]
        title: String,
        #[arg(long = "invitee")]
        invitees: Vec<UserId>,
    },
    /// Accept or decline an invitation.
    Respond {
        #[arg(long)]
        hangout: HangoutId,
        #[arg(long)]
        user: UserId,
        #[arg(long, value_enum)]
        answer: Answer,
    },
    /// Leave a hangout.
    Leave {
        #[arg(long)]
        hangout: HangoutId,
        #[arg(long)]
        user: UserId,
    },
    /// Cancel a hangout and everything attached to it.
    Cancel {
        #[arg(long)]
        hangout: HangoutId,
    },
    /// Show a hangout and its participants.
    Show {
        #[arg(long)]
        hangout: HangoutId,
    },
    /// Time poll commands.
    #[command(subcommand)]
    Poll(PollCommand),
    /// Confirm the chosen time and submit a start address and travel budget.
    ConfirmTime {
        #[arg(long)]
        hangout: HangoutId,
        #[arg(long)]
        user: UserId,
        #[arg(long)]
        address: String,
        /// walking, driving, public_transport, or cycling.
        #[arg(long)]
        mode: String,
        #[arg(long)]
        minutes: u32,
    },
    /// Run the place recommendation again.
    Recommend {
        #[arg(long)]
        hangout: HangoutId,
    },
    /// List the recommended places.
    Places {
        #[arg(long)]
        hangout: HangoutId,
    },
    /// Rank recommended places, best first.
    Rank {
        #[arg(long)]
        hangout: HangoutId,
        #[arg(long)]
        user: UserId,
        /// `RECOMMENDATION_ID:RANK`, repeated once per place.
        #[arg(long = "place", value_parser = parse_ranked_place)]
        places: Vec<(RecommendationId, u32)>,
    },
    /// Accept or decline the chosen place.
    ConfirmMeetup {
        #[arg(long)]
        hangout: HangoutId,
        #[arg(long)]
        user: UserId,
        #[arg(long, value_enum)]
        answer: Answer,
    },
}

#[derive(Debug, Subcommand)]
pub enum PollCommand {
    /// Offer time options; only the creator may do this.
    Create {
        #[arg(long)]
        hangout: HangoutId,
        #[arg(long)]
        user: UserId,
        /// `YYYY-MM-DD,HH:MM,HH:MM`, repeated once per option.
        #[arg(long = "window")]
        windows: Vec<TimeWindow>,
    },
    /// Show options, votes, and the current leader.
    Show {
        #[arg(long)]
        hangout: HangoutId,
    },
    /// Vote for every option that suits you.
    Vote {
        #[arg(long)]
        hangout: HangoutId,
        #[arg(long)]
        user: UserId,
        #[arg(long = "option")]
        options: Vec<TimeOptionId>,
    },
}

fn parse_ranked_place(raw: &str) -> Result<(RecommendationId, u32), String> {
    let (id, rank) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected RECOMMENDATION_ID:RANK, got {raw:?}"))?;
    let id = id
        .parse::<RecommendationId>()
        .map_err(|err| format!("recommendation id {id:?}: {err}"))?;
    let rank = rank
        .trim()
        .parse::<u32>()
        .map_err(|err| format!("rank {rank:?}: {err}"))?;
    Ok((id, rank))
}

/// Run `command`, connecting to storage and providers unless it is a migration.
pub async fn run(command: Command, settings: &MeetsyncSettings) -> Result<Value, CliError> {
    match command {
        Command::Migrate => {
            let applied = run_pending_migrations(settings.database_url()?).await?;
            info!(count = applied.len(), "database is up to date");
            Ok(json!({ "applied": applied }))
        }
        Command::Hangout(command) => {
            let services = connect(settings).await?;
            execute(&services, command).await
        }
    }
}

/// Dispatch one hangout command and encode its result.
pub async fn execute(services: &Services, command: HangoutCommand) -> Result<Value, CliError> {
    let value = match command {
        HangoutCommand::Create {
            creator,
            creator_name,
            title,
            invitees,
        } => serde_json::to_value(
            services
                .hangouts
                .create_hangout(creator, &creator_name, &title, invitees)
                .await?,
        )?,
        HangoutCommand::Respond {
            hangout,
            user,
            answer,
        } => {
            let response = match answer {
                Answer::Accept => InviteResponse::Accept,
                Answer::Decline => InviteResponse::Decline,
            };
            serde_json::to_value(
                services
                    .hangouts
                    .respond_to_invite(hangout, &user, response)
                    .await?,
            )?
        }
        HangoutCommand::Leave { hangout, user } => {
            serde_json::to_value(services.hangouts.leave_hangout(hangout, &user).await?)?
        }
        HangoutCommand::Cancel { hangout } => {
            services.hangouts.cancel_hangout(hangout).await?;
            json!({ "cancelled": hangout })
        }
        HangoutCommand::Show { hangout } => json!({
            "hangout": services.hangouts.get_hangout(hangout).await?,
            "participants": services.hangouts.list_participants(hangout).await?,
        }),
        HangoutCommand::Poll(PollCommand::Create {
            hangout,
            user,
            windows,
        }) => serde_json::to_value(services.polls.create_poll(hangout, &user, windows).await?)?,
        HangoutCommand::Poll(PollCommand::Show { hangout }) => {
            serde_json::to_value(services.polls.get_poll(hangout).await?)?
        }
        HangoutCommand::Poll(PollCommand::Vote {
            hangout,
            user,
            options,
        }) => serde_json::to_value(services.polls.cast_votes(hangout, &user, options).await?)?,
        HangoutCommand::ConfirmTime {
            hangout,
            user,
            address,
            mode,
            minutes,
        } => {
            let details = LocationDetails::new(address, &mode, minutes)
                .map_err(|err| Error::invalid_request(err.to_string()))?;
            serde_json::to_value(
                services
                    .locations
                    .confirm_time(hangout, &user, details)
                    .await?,
            )?
        }
        HangoutCommand::Recommend { hangout } => {
            serde_json::to_value(services.locations.rerun_recommendations(hangout).await?)?
        }
        HangoutCommand::Places { hangout } => {
            serde_json::to_value(services.locations.get_recommendations(hangout).await?)?
        }
        HangoutCommand::Rank {
            hangout,
            user,
            places,
        } => serde_json::to_value(
            services
                .locations
                .submit_place_ranking(hangout, &user, places)
                .await?,
        )?,
        HangoutCommand::ConfirmMeetup {
            hangout,
            user,
            answer,
        } => serde_json::to_value(
            services
                .locations
                .confirm_meetup(hangout, &user, answer == Answer::Accept)
                .await?,
        )?,
    };
    Ok(value)
}
