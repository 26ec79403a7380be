use loctool::{HtmlFileType, ProjectConfig, ResourceString, Settings, TranslationSet};
use tracing::info;

const PAGE: &str = r#"<html>
<body>
  <h1 title="Welcome banner">Welcome</h1>
  <!-- i18n: shown below the banner -->
  <p>This is a <b>test</b> of the emergency parsing system.</p>
  <img src="logo.png" alt="Company logo">
  <script>var greeting = "not translated";</script>
</body>
</html>
"#;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let project = ProjectConfig::new("demo").with_settings(Settings {
        missing_pseudo: true,
        ..Settings::default()
    });
    let file_type = HtmlFileType::new(project);
    let mut file = file_type.new_file("index.html");
    file.parse(PAGE)?;

    println!("Extracted resources:");
    for resource in file.translation_set().iter() {
        println!("{}", serde_json::to_string(resource)?);
    }

    let mut translations = TranslationSet::new("en-US");
    translations.add(
        ResourceString::new(
            "demo",
            "en-US",
            "r306365966",
            "This is a <c0>test</c0> of the emergency parsing system.",
        )
        .with_target(
            "fr-FR",
            "Ceci est un <c0>essai</c0> du système d'analyse syntaxique de l'urgence.",
        )
        .with_datatype("html"),
    );

    for locale in ["fr-FR", "zxx-XX"] {
        println!("\n{}:\n{}", locale, file.localize_text(&translations, locale));
    }

    let new_resources = file_type.new_resources().snapshot();
    info!("{} strings need translation", new_resources.size());
    Ok(())
}
