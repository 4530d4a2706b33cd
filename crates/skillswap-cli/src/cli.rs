use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// SkillSwap: exchange skills with people near you
#[derive(Parser, Debug)]
#[command(name = "skillswap", author, version, about, long_about = None)]
pub struct Args {
    /// Where the session (token and profile) is kept between runs
    #[arg(long, value_enum, default_value_t = StoreKind::File, global = true)]
    pub store: StoreKind,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum StoreKind {
    /// JSON file in the cache directory
    File,
    /// OS keychain
    Keyring,
    /// Passphrase-encrypted file (SKILLSWAP_PASSPHRASE or prompt)
    Encrypted,
    /// Nothing persisted; the session ends with the process
    Memory,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an account
    Signup {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        location: Option<String>,
        /// Skills you can teach (repeatable)
        #[arg(long = "offer")]
        skills_offered: Vec<String>,
        /// Skills you want to learn (repeatable)
        #[arg(long = "want")]
        skills_wanted: Vec<String>,
        /// When you are available (repeatable)
        #[arg(long)]
        availability: Vec<String>,
    },
    /// Log in and remember the session
    Login {
        /// Defaults to the last email used
        #[arg(long)]
        email: Option<String>,
    },
    /// Forget the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
    /// Request a password reset email
    ForgotPassword {
        #[arg(long)]
        email: String,
    },
    /// Set a new password with the token from a reset email
    ResetPassword {
        #[arg(long)]
        token: String,
    },
    /// Change the password of the logged-in user
    ChangePassword,
    /// Dashboard with swap requests and feedback
    Dashboard {
        /// Another user's dashboard; defaults to your own
        #[arg(long)]
        user: Option<String>,
    },
    /// Update your profile (PUT /api/user/profile)
    UpdateProfile {
        #[command(flatten)]
        fields: ProfileFields,
    },
    /// Update your profile (PUT /api/users/profile)
    UpdateUserProfile {
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        location: Option<String>,
        #[arg(long = "offer")]
        skills_offered: Vec<String>,
        #[arg(long = "want")]
        skills_wanted: Vec<String>,
        #[arg(long)]
        availability: Option<String>,
    },
    /// Upload a profile picture
    UploadPicture { path: PathBuf },
    /// Find users, optionally by skill
    Search {
        #[arg(long)]
        skill: Option<String>,
    },
    /// Swap requests
    #[command(subcommand)]
    Swap(SwapCommand),
    /// Feedback on completed swaps
    #[command(subcommand)]
    Feedback(FeedbackCommand),
    /// Browse suggested matches
    Matches {
        /// Hide a match you liked (repeatable)
        #[arg(long)]
        like: Vec<String>,
        /// Hide a match you passed on (repeatable)
        #[arg(long)]
        pass: Vec<String>,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct ProfileFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub location: Option<String>,
    #[arg(long = "offer")]
    pub skills_offered: Vec<String>,
    #[arg(long = "want")]
    pub skills_wanted: Vec<String>,
    #[arg(long)]
    pub availability: Vec<String>,
}

#[derive(Subcommand, Debug)]
pub enum SwapCommand {
    /// Ask another user for a swap
    Send {
        #[arg(long)]
        to: String,
        #[arg(long)]
        offer: String,
        #[arg(long)]
        want: String,
        #[arg(long)]
        availability: Vec<String>,
        #[arg(long)]
        message: Option<String>,
    },
    /// List your swap requests
    List,
    /// Accept a request
    Accept { id: String },
    /// Reject a request
    Reject { id: String },
    /// Delete a request
    Delete { id: String },
}

#[derive(Subcommand, Debug)]
pub enum FeedbackCommand {
    /// Rate a completed swap
    Submit {
        #[arg(long)]
        to: String,
        #[arg(long)]
        swap: String,
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
        rating: u8,
        #[arg(long)]
        message: String,
        #[arg(long)]
        skill: String,
    },
    /// List feedback
    List,
}

/// Empty repeatable flags mean "leave unchanged".
pub fn non_empty(values: Vec<String>) -> Option<Vec<String>> {
    if values.is_empty() {
        None
    } else {
        Some(values)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_swap_accept() {
        let args = Args::try_parse_from(["skillswap", "swap", "accept", "r1"]).expect("parse");
        assert_eq!(args.store, StoreKind::File);
        assert!(matches!(
            args.command,
            Command::Swap(SwapCommand::Accept { ref id }) if id == "r1"
        ));
    }

    #[test]
    fn test_parse_repeatable_skills() {
        let args = Args::try_parse_from([
            "skillswap",
            "--store",
            "memory",
            "update-profile",
            "--offer",
            "Guitar",
            "--offer",
            "Piano",
        ])
        .expect("parse");
        assert_eq!(args.store, StoreKind::Memory);
        match args.command {
            Command::UpdateProfile { fields } => {
                assert_eq!(fields.skills_offered, vec!["Guitar", "Piano"]);
                assert!(fields.skills_wanted.is_empty());
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rating_out_of_range_rejected() {
        let result = Args::try_parse_from([
            "skillswap", "feedback", "submit", "--to", "u1", "--swap", "r1", "--rating", "6",
            "--message", "hi", "--skill", "Chess",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(vec![]), None);
        assert_eq!(non_empty(vec!["a".to_string()]), Some(vec!["a".to_string()]));
    }
}
