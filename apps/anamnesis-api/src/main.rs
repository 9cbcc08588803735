use clap::Parser;

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
	color_eyre::install()?;
	let args = anamnesis_api::Args::parse();
	anamnesis_api::run(args).await
}
