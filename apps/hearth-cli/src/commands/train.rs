use std::path::PathBuf;

use clap::Args;
use hearth_core::Trainer;

use super::load_config;

/// Train the model and write `model.bin` and `model_features.json`
#[derive(Args, Debug, Clone)]
pub struct TrainCommand {
    /// TOML configuration file
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Override the artifact output directory
    #[arg(long, short = 'o')]
    pub output_dir: Option<PathBuf>,
}

impl TrainCommand {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        let mut config = load_config(self.config.as_deref())?;
        if let Some(dir) = &self.output_dir {
            config.training.output_dir = dir.clone();
        }

        let report = Trainer::new(config).run()?;
        let eval = &report.evaluation;

        println!("Train rows:   {}", eval.n_train);
        println!("Holdout rows: {}", eval.n_test);
        println!("r2 score:     {:.6}", eval.holdout_r2);
        println!(
            "CV r2:        {:.6} (std {:.6}, {} folds)",
            eval.cv_mean,
            eval.cv_std,
            eval.cv_scores.len()
        );
        println!("Top features:");
        for (name, value) in eval.importances.iter().take(5) {
            println!("  {:<28} {:.4}", name, value);
        }
        println!("Model:    {}", report.paths.model.display());
        println!("Features: {}", report.paths.features.display());
        Ok(())
    }
}
