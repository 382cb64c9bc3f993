use std::path::PathBuf;

use clap::{Args, Subcommand};

use super::{read_upload, Context};
use crate::admin::{self, UserDraft};
use crate::models::Organization;
use crate::session::UserLevel;

#[derive(Debug, Args)]
pub struct AdminArgs {
    #[command(subcommand)]
    pub command: AdminCmds,
}

#[derive(Debug, Subcommand)]
pub enum AdminCmds {
    /// List staff accounts
    Users,
    /// Create a user, or update it when --id is given
    SaveUser {
        #[arg(long, default_value_t = 0)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        username: String,
        /// Required for new users; omit on update to keep the current one
        #[arg(long, env = "BACKOFFICE_NEW_PASSWORD", hide_env_values = true)]
        password: Option<String>,
        #[arg(long, default_value = "user", value_parser = parse_level)]
        level: UserLevel,
    },
    /// Delete a user
    DeleteUser { id: i64 },
    /// Show the shop profile
    Org,
    /// Replace the shop profile
    SaveOrg {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long, default_value = "")]
        address: String,
        #[arg(long, default_value = "")]
        email: String,
        #[arg(long, default_value = "")]
        website: String,
        #[arg(long, default_value = "")]
        promptpay: String,
        #[arg(long, default_value = "")]
        tax_code: String,
        /// Stored logo file name to keep
        #[arg(long, default_value = "")]
        logo: String,
        /// Upload this image and use it as the logo
        #[arg(long, value_name = "PATH", conflicts_with = "logo")]
        logo_file: Option<PathBuf>,
    },
    /// Upload a shop logo and print its stored name
    UploadLogo { path: PathBuf },
}

fn parse_level(raw: &str) -> Result<UserLevel, String> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "admin" => Ok(UserLevel::Admin),
        "user" => Ok(UserLevel::User),
        other => Err(format!("Invalid level: {other}. Must be admin or user")),
    }
}

pub async fn run(ctx: &Context, args: AdminArgs) -> anyhow::Result<()> {
    let api = &ctx.api;
    match args.command {
        AdminCmds::Users => {
            for user in admin::list_users(api).await? {
                println!(
                    "#{:<5} {:<20} {:<16} {:?}",
                    user.id, user.name, user.username, user.level
                );
            }
        }
        AdminCmds::SaveUser {
            id,
            name,
            username,
            password,
            level,
        } => {
            admin::save_user(
                api,
                UserDraft {
                    id,
                    name,
                    username,
                    password,
                    level,
                },
            )
            .await?;
            println!("user saved");
        }
        AdminCmds::DeleteUser { id } => {
            admin::delete_user(api, id).await?;
            println!("user #{id} deleted");
        }
        AdminCmds::Org => match admin::organization(api).await? {
            Some(org) => {
                println!("{}", org.name);
                for (label, value) in [
                    ("phone", &org.phone),
                    ("address", &org.address),
                    ("email", &org.email),
                    ("website", &org.website),
                    ("promptpay", &org.promptpay),
                    ("tax code", &org.tax_code),
                    ("logo", &org.logo),
                ] {
                    if !value.is_empty() {
                        println!("  {label}: {value}");
                    }
                }
            }
            None => println!("(no shop profile yet)"),
        },
        AdminCmds::SaveOrg {
            name,
            phone,
            address,
            email,
            website,
            promptpay,
            tax_code,
            logo,
            logo_file,
        } => {
            let logo = match logo_file {
                Some(path) => {
                    let (file_name, bytes) = read_upload(&path).await?;
                    admin::upload_logo(api, &file_name, bytes).await?
                }
                None => logo,
            };
            admin::save_organization(
                api,
                Organization {
                    name,
                    phone,
                    address,
                    email,
                    website,
                    promptpay,
                    tax_code,
                    logo,
                    ..Organization::default()
                },
            )
            .await?;
            println!("shop profile saved");
        }
        AdminCmds::UploadLogo { path } => {
            let (file_name, bytes) = read_upload(&path).await?;
            println!("{}", admin::upload_logo(api, &file_name, bytes).await?);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn level_parsing_is_case_insensitive() {
        assert_eq!(parse_level("Admin"), Ok(UserLevel::Admin));
        assert_eq!(parse_level(" user "), Ok(UserLevel::User));
        assert!(parse_level("root").is_err());
    }
}
