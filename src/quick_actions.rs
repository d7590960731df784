// Predefined buttons shown above the input field.

pub const CALCULATE_COST: &str = "💰 Рассчитать стоимость";
pub const WEEKEND_AVAILABILITY: &str = "🔥 Свободно на выходные";
pub const CONTACT_ADMIN: &str = "📞 Связаться с администратором";
pub const REMIND_LATER: &str = "🔔 Напомнить позже";

/// Button labels in display order.
pub const QUICK_ACTIONS: &[&str] = &[
    CALCULATE_COST,
    WEEKEND_AVAILABILITY,
    CONTACT_ADMIN,
    REMIND_LATER,
    "📸 Фото базы",
    "📍 Как добраться",
    "🏡 Домики",
    "🌿 Беседки",
    "🎉 Банкетные залы",
];

/// Header shortcuts; each sends a fixed question.
pub const TOPIC_SHORTCUTS: &[(&str, &str)] = &[
    ("Домики", "Расскажи про домики"),
    ("Беседки", "Про беседки"),
    ("Залы", "Банкетные залы"),
    ("Где мы", "Где вы находитесь?"),
];

/// True for the label that opens the cost calculator instead of sending.
pub fn opens_calculator(text: &str) -> bool {
    text == CALCULATE_COST
}

/// The text handed to the reply provider for what the visitor sent.
pub fn outgoing_text(text: &str) -> &str {
    match text {
        REMIND_LATER => "Напомнить о бронировке позже",
        CONTACT_ADMIN => "Я хочу связаться с администратором",
        other => other,
    }
}
