pub const CHAT_SYSTEM: &str = include_str!("../data/prompts/chat_system.txt");
pub const PERSONALITY: &str = include_str!("../data/prompts/personality.txt");
pub const QUIZ: &str = include_str!("../data/prompts/quiz.txt");
pub const STORY: &str = include_str!("../data/prompts/story.txt");
pub const CHOICE: &str = include_str!("../data/prompts/choice.txt");
pub const IMAGE_SCENE: &str = include_str!("../data/prompts/image_scene.txt");
pub const IMAGE_CLIMAX: &str = include_str!("../data/prompts/image_climax.txt");
pub const IMAGE_OUTCOME: &str = include_str!("../data/prompts/image_outcome.txt");
pub const OUTCOME: &str = include_str!("../data/prompts/outcome.txt");
pub const CAPTION_SCENE: &str = include_str!("../data/prompts/caption_scene.txt");
pub const CAPTION_CLIMAX: &str = include_str!("../data/prompts/caption_climax.txt");
pub const CAPTION_OUTCOME: &str = include_str!("../data/prompts/caption_outcome.txt");
pub const LIFE_REVIEW: &str = include_str!("../data/prompts/life_review.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}
