use teloxide::types::{
    ButtonRequest, InlineKeyboardButton, InlineKeyboardMarkup, KeyboardButton, KeyboardMarkup,
};

use crate::bot::admin::AdminAction;
use crate::bot::menu::MenuAction;
use crate::messages::LOCATION_BUTTON;

fn menu_button(label: &str, action: MenuAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.callback_data())
}

fn admin_button(label: &str, action: AdminAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(label, action.callback_data())
}

pub fn main_menu() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![menu_button("🕌 عرض مواعيد الصلاة", MenuAction::PrayerTimes)],
        vec![menu_button("📍 مشاركة موقعي", MenuAction::ShareLocation)],
        vec![menu_button("🔔 تفعيل / إيقاف تذكير الصلاة", MenuAction::ToggleReminder)],
        vec![menu_button("🚫 إلغاء الاشتراك", MenuAction::Unsubscribe)],
    ])
}

pub fn admin_console() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![
        vec![
            admin_button("📢 رسالة جماعية", AdminAction::Broadcast),
            admin_button("📣 إعلان", AdminAction::Announce),
        ],
        vec![
            admin_button("📋 المشتركين", AdminAction::ListUsers),
            admin_button("🔎 بحث بالـ ID", AdminAction::SearchUser),
        ],
        vec![
            admin_button("❌ حذف عضو", AdminAction::DeleteUser),
            admin_button("🔢 عدد المشتركين", AdminAction::Count),
        ],
        vec![
            admin_button("📊 حالة البوت", AdminAction::Status),
            admin_button("✅ اختبار رسالة", AdminAction::TestBroadcast),
        ],
    ])
}

/// Reply keyboard with a single button that shares the user's location.
pub fn location_request() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![vec![
        KeyboardButton::new(LOCATION_BUTTON).request(ButtonRequest::Location),
    ]])
}
