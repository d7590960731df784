//! Canned replies used when no model credential is configured.
//!
//! Rules are checked top to bottom against the lower-cased message and the
//! first rule with a matching keyword wins, so a message mentioning both a
//! cabin and a price gets the cabin answer.

struct Rule {
    topic: &'static str,
    keywords: &'static [&'static str],
    reply: &'static str,
}

const RULES: &[Rule] = &[
    Rule {
        topic: "lodging",
        keywords: &["домик", "дом"],
        reply: "🏡 У нас есть два уютных домика:\n\n• Домик №1 — до 6 человек, есть кухня и терраса\n• Домик №2 — до 9 человек, просторный зал\n\nХотите узнать цены или забронировать?",
    },
    Rule {
        topic: "gazebo",
        keywords: &["беседк"],
        reply: "🌿 Беседки на 10-25 человек с мангалом и зоной отдыха. Отличный выбор для пикника! Цена от 50 BYN/час.",
    },
    Rule {
        topic: "sauna",
        keywords: &["бан"],
        reply: "🧖 Русская баня с парной, комнатой отдыха и бассейном. Вместимость до 8 человек. Цена: 80 BYN/час.",
    },
    Rule {
        topic: "hall",
        keywords: &["зал", "банкет"],
        reply: "🎉 Банкетные залы на 35-100 человек для свадеб, юбилеев и корпоративов. Полное оформление включено!",
    },
    Rule {
        topic: "price",
        keywords: &["цен", "стоим", "рассчит"],
        reply: "💰 Примерные цены:\n• Беседки: от 50 BYN/час\n• Домики: от 150 BYN/сутки\n• Баня: 80 BYN/час\n• Залы: от 200 BYN\n\nДля точного расчёта укажите дату и количество гостей!",
    },
    Rule {
        topic: "location",
        keywords: &["где", "адрес", "находи", "добрать"],
        reply: "📍 Мы находимся в 7 км от Бобруйска, в живописном сосновом бору. Удобный подъезд, есть парковка!",
    },
    Rule {
        topic: "admin",
        keywords: &["администратор", "связ"],
        reply: "📞 Для связи с администратором:\n• Телефон: +375 (29) 123-45-67\n• Время работы: 9:00 — 21:00\n\nПерезвоним в течение 10 минут!",
    },
    Rule {
        topic: "reminder",
        keywords: &["напомн"],
        reply: "🔔 Хорошо! Напомню вам о бронировании. Оставьте свой номер телефона, и мы свяжемся с вами в удобное время.",
    },
    Rule {
        topic: "photos",
        keywords: &["фото"],
        reply: "📸 С радостью покажу вам нашу красоту!\n• Территории и соснового леса 🌲\n• Уютных домиков 🏠\n• Банкетных залов 🎉\n• Баня и беседок ♨️",
    },
    Rule {
        topic: "availability",
        keywords: &["свободн", "выходн"],
        reply: "🔥 Свободные объекты на ближайшие выходные:\n\n🏡 Домик №1 — свободен в субботу\n♨️ Баня — воскресенье\n🍖 Беседка на 20 чел — вся суббота\n\n❗Хотите забронировать?",
    },
];

pub const GENERIC_REPLY: &str = "🌲 Спасибо за интерес к базе отдыха «Берёзка»! Чем могу помочь? Выберите интересующую тему или задайте вопрос.";

/// Picks the canned reply for `message`.
pub fn fallback_reply(message: &str) -> &'static str {
    let lowercase = message.to_lowercase();
    match RULES
        .iter()
        .find(|rule| rule.keywords.iter().any(|k| lowercase.contains(k)))
    {
        Some(rule) => {
            tracing::debug!(topic = rule.topic, "Fallback rule matched");
            rule.reply
        }
        None => GENERIC_REPLY,
    }
}
