//! Renders the language-specific instruction prompt sent to the model.

use crate::config::Prompts;
use crate::domain::Language;
use crate::util::fill_template;

/// `text` is substituted last so placeholders typed by the user are left untouched.
pub fn build(prompts: &Prompts, text: &str, level: u32, difficulty: &str, lang: Language) -> String {
  let tpl = match lang {
    Language::Arabic => &prompts.arabic_template,
    Language::French => &prompts.french_template,
  };
  let level = level.to_string();
  fill_template(tpl, &[("level", &level), ("difficulty", difficulty), ("text", text)])
}
