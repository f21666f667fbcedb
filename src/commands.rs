use teloxide::utils::command::BotCommands;

#[derive(Debug, Clone, Copy, PartialEq, Eq, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "главное меню.")]
    Start,
    #[command(description = "список команд.")]
    Help,
}
