//! Game orchestration: sequences chat completions and image jobs into the
//! payloads each game step needs.
//!
//! Every operation builds fresh [`ChatSession`]s, so concurrent requests
//! never share mutable history. Within one operation all text-model calls
//! are sequential (each feeds the next prompt); the two-image fan-out in
//! [`GameService::generate_stage`] is the only concurrency.

use crate::chat::{ChatApi, ChatSession};
use crate::imagegen::ImageJobClient;
use crate::models::{BasicInfo, GeneratedImage, StageRecord, UserData};
use crate::quiz::{self, QuizSet};
use crate::stages::{self, Stage};
use crate::{prompts, Error, Result};
use std::path::Path;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

const IMAGE_PROMPT_MAX_CHARS: usize = 500;
const DEFAULT_CHOICE_QUESTION: &str = "How do you choose?";

pub struct GameService {
    chat: Arc<dyn ChatApi>,
    images: Arc<ImageJobClient>,
}

/// Payload of a completed `start` call.
#[derive(Debug, Clone)]
pub struct StartOutcome {
    pub personality: String,
    pub user_data: UserData,
}

/// Payload of one generated life stage.
#[derive(Debug, Clone)]
pub struct StageContent {
    pub story: String,
    pub question: String,
    pub options: Vec<String>,
    pub images: Vec<GeneratedImage>,
}

/// Payload of a stage outcome after the player chose.
#[derive(Debug, Clone)]
pub struct OutcomeContent {
    pub outcome: String,
    pub image: GeneratedImage,
}

impl GameService {
    pub fn new(chat: Arc<dyn ChatApi>, images: Arc<ImageJobClient>) -> Self {
        Self { chat, images }
    }

    fn session(&self) -> ChatSession {
        ChatSession::with_system(self.chat.clone(), prompts::CHAT_SYSTEM.trim())
    }

    /// Generate the personality profile that seeds a new game.
    pub async fn start(&self, basic_info: &BasicInfo, answers: &[String]) -> Result<StartOutcome> {
        let prompt = prompts::render(
            prompts::PERSONALITY,
            &[
                ("gender", &basic_info.gender),
                ("mbti", &basic_info.mbti),
                ("zodiac", &basic_info.zodiac),
                ("background", &basic_info.background),
                ("answers", &answers.join(", ")),
            ],
        );

        let personality = self.session().send(&prompt, false).await?;
        tracing::info!("Generated personality profile ({} chars)", personality.len());

        Ok(StartOutcome {
            user_data: UserData {
                basic_info: basic_info.clone(),
                personality: personality.clone(),
                current_stage: 0,
                stages_data: Vec::new(),
            },
            personality,
        })
    }

    /// Ask the text model for quiz questions and parse them tier by tier.
    pub async fn quiz_questions(&self, basic_info: &BasicInfo) -> Result<QuizSet> {
        let prompt = prompts::render(
            prompts::QUIZ,
            &[
                ("gender", &basic_info.gender),
                ("mbti", &basic_info.mbti),
                ("zodiac", &basic_info.zodiac),
                ("background", &basic_info.background),
            ],
        );

        let reply = self.session().send(&prompt, false).await?;
        let set = quiz::parse_quiz_response(&reply);
        tracing::info!(
            "Quiz questions ready ({} questions, source {:?})",
            set.questions.len(),
            set.source
        );
        Ok(set)
    }

    /// Generate one life stage: story, choice question, and two images.
    pub async fn generate_stage(
        &self,
        stage_index: usize,
        user_data: &UserData,
        cancel: &CancellationToken,
    ) -> Result<StageContent> {
        let stage = stage_at(stage_index)?;
        let basic_info = &user_data.basic_info;

        // Story and choice share one session so the choice question can
        // lean on the story context.
        let mut session = self.session();
        let story_prompt = prompts::render(
            prompts::STORY,
            &[
                ("stage_name", stage.name),
                ("age_range", stage.age_range),
                ("gender", &basic_info.gender),
                ("mbti", &basic_info.mbti),
                ("zodiac", &basic_info.zodiac),
                ("background", &basic_info.background),
                ("personality", &user_data.personality),
            ],
        );
        let story = session.send(&story_prompt, false).await?;

        let choice_prompt = prompts::render(prompts::CHOICE, &[("story", &story)]);
        let choice_text = session.send(&choice_prompt, false).await?;
        let (question, options) = parse_choice(&choice_text);

        // Image prompts get a fresh session; the story is re-quoted in the
        // templates, so no chat context carries over.
        let mut session = self.session();
        let scene_reply = session
            .send(
                &prompts::render(prompts::IMAGE_SCENE, &[("story", &story)]),
                false,
            )
            .await?;
        let climax_reply = session
            .send(
                &prompts::render(prompts::IMAGE_CLIMAX, &[("story", &story)]),
                false,
            )
            .await?;
        let scene_prompt = styled_image_prompt(&scene_reply);
        let climax_prompt = styled_image_prompt(&climax_reply);

        // The only fan-out: both jobs submitted and polled concurrently,
        // joined before responding.
        tracing::info!("Submitting two image jobs for stage {}", stage.name);
        let (scene_path, climax_path) = tokio::join!(
            self.images
                .submit_and_save(&scene_prompt, None, serde_json::Map::new(), cancel),
            self.images
                .submit_and_save(&climax_prompt, None, serde_json::Map::new(), cancel),
        );
        let scene_path = scene_path?;
        let climax_path = climax_path?;

        let mut session = self.session();
        let scene_caption = session
            .send(
                &prompts::render(prompts::CAPTION_SCENE, &[("story", &story)]),
                false,
            )
            .await?;
        let climax_caption = session
            .send(
                &prompts::render(prompts::CAPTION_CLIMAX, &[("story", &story)]),
                false,
            )
            .await?;

        Ok(StageContent {
            story,
            question,
            options,
            images: vec![
                generated_image(&scene_path, scene_caption.trim())?,
                generated_image(&climax_path, climax_caption.trim())?,
            ],
        })
    }

    /// Generate the stage outcome for the player's choice.
    pub async fn generate_outcome(
        &self,
        stage_index: usize,
        story: &str,
        choice: &str,
        cancel: &CancellationToken,
    ) -> Result<OutcomeContent> {
        let stage = stage_at(stage_index)?;

        let mut session = self.session();
        let outcome_prompt = prompts::render(
            prompts::OUTCOME,
            &[
                ("story", story),
                ("choice", choice),
                ("stage_name", stage.name),
                ("age_range", stage.age_range),
            ],
        );
        let outcome = session.send(&outcome_prompt, false).await?;

        let image_reply = session
            .send(
                &prompts::render(prompts::IMAGE_OUTCOME, &[("outcome", &outcome)]),
                false,
            )
            .await?;
        let image_prompt = styled_image_prompt(&image_reply);

        tracing::info!("Submitting outcome image job for stage {}", stage.name);
        let path = self
            .images
            .submit_and_save(&image_prompt, None, serde_json::Map::new(), cancel)
            .await?;

        let caption = self
            .session()
            .send(
                &prompts::render(prompts::CAPTION_OUTCOME, &[("outcome", &outcome)]),
                false,
            )
            .await?;

        Ok(OutcomeContent {
            outcome,
            image: generated_image(&path, caption.trim())?,
        })
    }

    /// Summarize all played stages into one short passage.
    pub async fn life_review(
        &self,
        user_data: &UserData,
        stage_records: &[StageRecord],
    ) -> Result<String> {
        let mut recap = String::new();
        for (index, record) in stage_records.iter().enumerate() {
            let stage_name = stages::stage(index).map(|s| s.name).unwrap_or("later life");
            recap.push_str(&format!(
                "Stage {} ({}):\nStory: {}\nChoice: {}\nOutcome: {}\n\n",
                index + 1,
                stage_name,
                record.story,
                record.choice,
                record.outcome
            ));
        }
        if recap.is_empty() {
            recap.push_str(&format!(
                "No stages were recorded. Personality profile: {}",
                user_data.personality
            ));
        }

        let prompt = prompts::render(prompts::LIFE_REVIEW, &[("stages", recap.trim())]);
        self.session().send(&prompt, false).await
    }
}

fn stage_at(index: usize) -> Result<&'static Stage> {
    stages::stage(index).ok_or(Error::InvalidStage(index))
}

/// First non-empty line is the question; option lines start with `A.`,
/// `B.`, or `C.`. An empty reply falls back to a canned question.
fn parse_choice(text: &str) -> (String, Vec<String>) {
    let mut lines = text.lines().map(str::trim).filter(|l| !l.is_empty());
    let question = lines
        .next()
        .unwrap_or(DEFAULT_CHOICE_QUESTION)
        .to_string();
    let options = lines
        .filter(|line| {
            line.starts_with("A.") || line.starts_with("B.") || line.starts_with("C.")
        })
        .map(str::to_string)
        .collect();
    (question, options)
}

/// Strip label prefixes the model tends to add, bound the length, and wrap
/// the result in the comic style the game renders in.
fn styled_image_prompt(reply: &str) -> String {
    let mut prompt = reply.trim();
    for prefix in ["Prompt:", "prompt:", "PROMPT:"] {
        prompt = prompt.strip_prefix(prefix).unwrap_or(prompt).trim();
    }
    let truncated = match prompt.char_indices().nth(IMAGE_PROMPT_MAX_CHARS) {
        Some((byte_index, _)) => &prompt[..byte_index],
        None => prompt,
    };
    format!("comic style, {}, colorful, detailed", truncated)
}

fn generated_image(path: &Path, description: &str) -> Result<GeneratedImage> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| Error::Generic(format!("Invalid image path: {}", path.display())))?;
    Ok(GeneratedImage {
        path: format!("/images/{}", file_name),
        description: description.to_string(),
    })
}
