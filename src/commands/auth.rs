use clap::Args;

use super::Context;

#[derive(Debug, Args)]
pub struct SigninArgs {
    #[arg(long, short = 'u')]
    pub username: String,
    #[arg(long, short = 'p', env = "BACKOFFICE_PASSWORD", hide_env_values = true)]
    pub password: String,
}

pub async fn run(ctx: &Context, args: SigninArgs) -> anyhow::Result<()> {
    let resp = ctx.api.sign_in(&args.username, &args.password).await?;
    let name = ctx.session.user_name().unwrap_or_default();
    eprintln!("signed in as {name} ({:?}) at {}", resp.level, ctx.api.base_url());
    println!("export BACKOFFICE_TOKEN={}", resp.token);
    println!("export BACKOFFICE_USER_ID={}", resp.id);
    Ok(())
}
