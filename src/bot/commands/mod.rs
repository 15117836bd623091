use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Sadqa Bot commands:")]
pub enum Command {
    #[command(description = "Subscribe and open the main menu")]
    Start,
    #[command(description = "Open the owner control panel")]
    Dash,
    #[command(description = "Display this help message")]
    Help,
}
