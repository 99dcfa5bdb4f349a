use crate::dataset::{ClassIndex, DatasetSource, RaceIndex};
use crate::error::{GenError, Result};
use crate::llm::LlmClient;
use crate::messages::Notice;
use crate::model::{Batch, GeneratedCharacter};
use crate::prompt::{build_prompt, FieldRequest};
use crate::response::parse_response;
use crate::selector::{pick_class_subclass, pick_race};
use indicatif::ProgressBar;
use log::{debug, info};
use rand::Rng;

pub const MIN_COUNT: usize = 1;
pub const MAX_COUNT: usize = 5;

/// A validated generation request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchRequest {
    pub count: usize,
    pub theme: String,
    pub fields: FieldRequest,
}

impl BatchRequest {
    /// Validates the raw count entry. The theme only counts when its toggle
    /// is on and it is non-blank.
    pub fn parse(count: &str, theme: Option<&str>, fields: FieldRequest) -> Result<Self> {
        let count = parse_count(count)?;
        let theme = theme.map(str::trim).unwrap_or_default().to_string();
        Ok(Self { count, theme, fields })
    }

    pub fn wants_ai(&self) -> bool {
        !self.fields.is_empty()
    }
}

pub fn parse_count(raw: &str) -> Result<usize> {
    match raw.trim().parse::<usize>() {
        Ok(n) if (MIN_COUNT..=MAX_COUNT).contains(&n) => Ok(n),
        _ => Err(GenError::Validation(Notice::InvalidCount.to_string())),
    }
}

pub struct Generator<R> {
    dataset: Box<dyn DatasetSource>,
    llm: Option<Box<dyn LlmClient>>,
    rng: R,
    progress: ProgressBar,
}

impl<R: Rng + Send> Generator<R> {
    pub fn new(dataset: Box<dyn DatasetSource>, llm: Option<Box<dyn LlmClient>>, rng: R) -> Self {
        Self {
            dataset,
            llm,
            rng,
            progress: ProgressBar::hidden(),
        }
    }

    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = progress;
        self
    }

    pub fn has_llm(&self) -> bool {
        self.llm.is_some()
    }

    /// Validates the raw form input, then runs the batch.
    pub async fn generate(
        &mut self,
        count: &str,
        theme: Option<&str>,
        fields: FieldRequest,
    ) -> Result<Batch> {
        let request = BatchRequest::parse(count, theme, fields)?;
        self.run_batch(&request).await
    }

    /// Produces `request.count` characters. Any failure discards the whole batch.
    pub async fn run_batch(&mut self, request: &BatchRequest) -> Result<Batch> {
        if request.wants_ai() && self.llm.is_none() {
            return Err(GenError::Configuration(
                "AI generation requested but no completion client is configured".to_string(),
            ));
        }

        info!("Generating {} character(s)", request.count);
        let races = self.dataset.races().await?;
        let class_index = self.dataset.class_index().await?;

        // The bar is shared across batches; start each one from a clean state.
        self.progress.reset();
        self.progress.set_length(request.count as u64);
        let result = self.fill_batch(request, &races, &class_index).await;
        self.progress.finish_and_clear();
        result
    }

    async fn fill_batch(
        &mut self,
        request: &BatchRequest,
        races: &RaceIndex,
        class_index: &ClassIndex,
    ) -> Result<Batch> {
        let llm = if request.wants_ai() {
            self.llm.as_deref()
        } else {
            None
        };

        let mut batch = Batch::default();
        for _ in 0..request.count {
            let race = pick_race(races, &mut self.rng)?;
            let class = pick_class_subclass(class_index, self.dataset.as_ref(), &mut self.rng).await?;
            let mut character = GeneratedCharacter::new(race, class);

            if let Some(llm) = llm {
                let prompt = build_prompt(&character.race, &character.class, &request.fields, &request.theme);
                debug!("Sending the following prompt to AI client:\n{}", prompt);

                let reply = llm.chat(&prompt).await.map_err(GenError::Completion)?;
                let parsed = parse_response(reply.as_deref(), &request.fields);
                debug!("Parsed sections: {:?}", parsed.to_map());
                character = character.with_details(&request.fields, &parsed);
            }

            batch.characters.push(character);
            self.progress.inc(1);
        }
        Ok(batch)
    }
}
