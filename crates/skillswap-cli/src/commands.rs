//! Command handlers. Each one drives a core operation and returns the JSON
//! to print.

use std::io::{self, Write};
use std::path::Path;

use anyhow::{Context, Result};
use serde_json::{json, Value};
use tracing::{info, warn};

use skillswap_core::models::{
    NewFeedback, NewSwapRequest, ProfilePatch, ProfileUpdate, SignupRequest, SwapStatus,
    UserProfileUpdate,
};
use skillswap_core::{ApiClient, ApiError, Config, KeyValueStore, MatchFeed, SessionStore};

use crate::cli::{non_empty, Command, FeedbackCommand, SwapCommand};

pub struct Runtime<'a, S: KeyValueStore> {
    pub config: &'a mut Config,
    pub api: &'a ApiClient,
    pub session: &'a mut SessionStore<S>,
}

fn prompt_line(label: &str) -> Result<String> {
    eprint!("{}: ", label);
    io::stderr().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}

fn prompt_password(label: &str) -> Result<String> {
    let password = rpassword::prompt_password(format!("{}: ", label))?;
    Ok(password)
}

/// Guess the upload MIME type from the file extension.
fn mime_for(path: &Path) -> &'static str {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

/// Fold a call result into the combined dashboard output.
fn or_error(result: Result<Value, ApiError>) -> Value {
    result.unwrap_or_else(|e| json!({ "error": e.to_string() }))
}

pub async fn run<S: KeyValueStore>(rt: Runtime<'_, S>, command: Command) -> Result<Value> {
    let Runtime {
        config,
        api,
        session,
    } = rt;
    let authed = session.authorized(api);

    let output = match command {
        Command::Signup {
            name,
            email,
            location,
            skills_offered,
            skills_wanted,
            availability,
        } => {
            let password = prompt_password("Choose a password")?;
            let request = SignupRequest {
                full_name: name,
                email,
                password,
                location,
                skills_offered,
                skills_wanted,
                availability,
            };
            api.signup(&request).await?
        }

        Command::Login { email } => {
            let email = match email.or_else(|| config.last_email.clone()) {
                Some(email) => email,
                None => prompt_line("Email")?,
            };
            let password = prompt_password("Password")?;

            let user = session.login(api, &email, &password).await?.clone();

            config.last_email = Some(email);
            if let Err(e) = config.save() {
                warn!(error = %e, "Failed to save config");
            }
            info!(user_id = %user.id, "Login successful");
            serde_json::to_value(user)?
        }

        Command::Logout => {
            session.logout();
            json!({ "authenticated": false })
        }

        Command::Whoami => json!({
            "authenticated": session.is_authenticated(),
            "user": session.user(),
        }),

        Command::ForgotPassword { email } => api.forgot_password(&email).await?,

        Command::ResetPassword { token } => {
            let password = prompt_password("New password")?;
            api.reset_password(&token, &password).await?
        }

        Command::ChangePassword => {
            let current = prompt_password("Current password")?;
            let new = prompt_password("New password")?;
            authed.change_password(&current, &new).await?
        }

        Command::Dashboard { user } => {
            // Independent calls; each may fail on its own.
            let (dashboard, requests, feedback) = futures::join!(
                authed.get_dashboard(user.as_deref()),
                authed.get_requests(),
                authed.get_feedback(),
            );
            json!({
                "dashboard": dashboard?,
                "requests": or_error(requests),
                "feedback": or_error(feedback),
            })
        }

        Command::UpdateProfile { fields } => {
            let update = ProfileUpdate {
                full_name: fields.name,
                email: fields.email,
                location: fields.location,
                skills_offered: non_empty(fields.skills_offered),
                skills_wanted: non_empty(fields.skills_wanted),
                availability: non_empty(fields.availability),
            };
            let response = authed.update_profile(&update).await?;
            session.update_user(ProfilePatch {
                full_name: update.full_name,
                email: update.email,
                location: update.location,
                skills_offered: update.skills_offered,
                skills_wanted: update.skills_wanted,
                availability: update.availability,
                ..Default::default()
            })?;
            response
        }

        Command::UpdateUserProfile {
            name,
            location,
            skills_offered,
            skills_wanted,
            availability,
        } => {
            let update = UserProfileUpdate {
                name,
                location,
                skills_offered: non_empty(skills_offered),
                skills_wanted: non_empty(skills_wanted),
                availability,
            };
            let response = authed.update_user_profile(&update).await?;
            session.update_user(ProfilePatch {
                full_name: update.name,
                location: update.location,
                skills_offered: update.skills_offered,
                skills_wanted: update.skills_wanted,
                availability: update.availability.map(|a| vec![a]),
                ..Default::default()
            })?;
            response
        }

        Command::UploadPicture { path } => {
            let bytes = std::fs::read(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            let file_name = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or("profile")
                .to_string();
            let response = authed
                .upload_profile_picture(&file_name, mime_for(&path), bytes)
                .await?;

            let picture = response
                .get("profilePicture")
                .or_else(|| response.get("profile_pic_url"))
                .and_then(Value::as_str)
                .map(str::to_string);
            if picture.is_some() {
                session.update_user(ProfilePatch {
                    profile_picture: picture,
                    ..Default::default()
                })?;
            }
            response
        }

        Command::Search { skill } => authed.search_users(skill.as_deref()).await?,

        Command::Swap(swap) => match swap {
            SwapCommand::Send {
                to,
                offer,
                want,
                availability,
                message,
            } => {
                let request = NewSwapRequest {
                    to_user_id: to,
                    offered_skill: offer,
                    wanted_skill: want,
                    availability,
                    message,
                };
                authed.send_request(&request).await?
            }
            SwapCommand::List => authed.get_requests().await?,
            SwapCommand::Accept { id } => {
                authed.update_request_status(&id, SwapStatus::Accepted).await?
            }
            SwapCommand::Reject { id } => {
                authed.update_request_status(&id, SwapStatus::Rejected).await?
            }
            SwapCommand::Delete { id } => authed.delete_request(&id).await?,
        },

        Command::Feedback(feedback) => match feedback {
            FeedbackCommand::Submit {
                to,
                swap,
                rating,
                message,
                skill,
            } => {
                let feedback = NewFeedback {
                    to_user_id: to,
                    swap_request_id: swap,
                    rating,
                    message,
                    skill,
                };
                authed.submit_feedback(&feedback).await?
            }
            FeedbackCommand::List => authed.get_feedback().await?,
        },

        Command::Matches { like, pass } => {
            let mut feed = MatchFeed::load(&authed).await?;
            for id in &like {
                feed.like(id);
            }
            for id in &pass {
                feed.pass(id);
            }
            json!({
                "newMatches": feed.visible().len(),
                "liked": feed.liked_count(),
                "averageScore": feed.average_score(),
                "matches": feed.visible(),
            })
        }
    };

    Ok(output)
}
