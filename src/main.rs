use sortify_classifier::pipeline::types::item_label;
use sortify_classifier::{ClassificationRequest, ClassifierError, Configuration};
use std::path::PathBuf;
use tower::ServiceExt;
use tracing::{info, warn};

fn init_logging(configuration: &Configuration) {
    tracing_subscriber::fmt()
        .with_max_level(configuration.log_level())
        .init();
}

#[tokio::main]
async fn main() -> Result<(), ClassifierError> {
    let configuration = Configuration::load()?;
    init_logging(&configuration);

    let mut args = std::env::args().skip(1);
    let Some(image_path) = args.next().map(PathBuf::from) else {
        eprintln!("usage: sortify <image> [description...]");
        std::process::exit(2);
    };
    let description = args.collect::<Vec<_>>().join(" ");

    let classifier = configuration.build_classifier()?;
    info!(
        "Classifying {} with {:?} strategy",
        image_path.display(),
        classifier.strategy()
    );

    let image = match tokio::fs::read(&image_path).await {
        Ok(bytes) => bytes,
        Err(e) => {
            warn!("Failed to read {}: {}", image_path.display(), e);
            Vec::new()
        }
    };

    let classification = classifier
        .oneshot(ClassificationRequest::new(image, description.clone()))
        .await?;

    let output = serde_json::json!({
        "item": item_label(&image_path, &description),
        "classification": classification,
        "tip": classification.most_likely.disposal_tip(),
    });
    println!(
        "{}",
        serde_json::to_string_pretty(&output).unwrap_or_else(|_| output.to_string())
    );

    Ok(())
}
