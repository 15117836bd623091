//! User-facing texts.

use chrono::NaiveTime;

use crate::services::prayer_times::PrayerEvent;
use crate::utils::datetime::format_clock_12h;

pub const WELCOME_MESSAGE: &str = "🌙 أهلًا بك في بوت صدقة\n\n\
ستصلك تذكيرات بمواعيد الصلاة، وآية ودعاء بشكل دوري، والصلاة على النبي ﷺ كل جمعة.\n\n\
اختر من القائمة 👇";

pub const NOT_SUBSCRIBED: &str = "❌ أنت غير مشترك، أرسل /start للاشتراك أولًا.";
pub const UNSUBSCRIBE_CONFIRM: &str = "🚫 تم إلغاء اشتراكك. يمكنك العودة في أي وقت بإرسال /start.";
pub const REMINDER_ENABLED: &str = "✅ تم تفعيل التذكير.";
pub const REMINDER_DISABLED: &str = "❌ تم إيقاف التذكير.";
pub const LOCATION_PROMPT: &str = "📍 اضغط الزر بالأسفل لمشاركة موقعك حتى نحسب مواعيد الصلاة بدقة.";
pub const LOCATION_BUTTON: &str = "📍 مشاركة موقعي";
pub const LOCATION_SAVED: &str = "✅ تم حفظ موقعك، ستصلك التذكيرات حسب مواعيد منطقتك.";
pub const LOCATION_INVALID: &str = "❌ الموقع المرسل غير صالح.";
pub const LOCATION_MISSING: &str = "📍 لم تشارك موقعك بعد. اختر «مشاركة موقعي» من القائمة أولًا.";
pub const PRAYER_ERROR: &str = "⚠️ تعذر جلب مواعيد الصلاة الآن، حاول مرة أخرى لاحقًا.";
pub const UNKNOWN_ERROR: &str = "⚠️ حدث خطأ غير متوقع، حاول مرة أخرى.";

pub const FRIDAY_BLESSING: &str = "ﷺ إنَّ اللَّهَ وَمَلَائِكَتَهُ يُصَلّونَ عَلَى النَّبِيِ \n\n\
اللهُمَّ صَلِّ وَسَلِّمْ وَبَارِكْ عَلَى سَيِّدِنَا مُحَمَّد 🤍";

// Admin console
pub const ADMIN_DENIED: &str = "❌ ليس لديك صلاحية الوصول إلى لوحة التحكم.";
pub const ADMIN_DENIED_SHORT: &str = "❌ غير مصرح.";
pub const ADMIN_WELCOME: &str = "مرحبًا بك في لوحة تحكم بوت صدقة 🎛️\nاختر من الأزرار التالية 👇";
pub const ADMIN_STATUS: &str = "📊 البوت يعمل بشكل جيد ✅";
pub const ADMIN_TEST_MESSAGE: &str = "📢 هذه رسالة اختبارية من مالك البوت.";
pub const ADMIN_BROADCAST_PROMPT: &str = "📝 أرسل الرسالة التي تريد إرسالها لجميع المشتركين.";
pub const ADMIN_ANNOUNCE_PROMPT: &str = "📝 أرسل الإعلان الآن.";
pub const ADMIN_SEARCH_PROMPT: &str = "🔎 أرسل ID المستخدم.";
pub const ADMIN_DELETE_PROMPT: &str = "❌ أرسل ID المستخدم لحذفه.";
pub const ADMIN_USER_NOT_FOUND: &str = "❌ المستخدم غير موجود.";
pub const ADMIN_USER_DELETED: &str = "🗑️ تم حذف المستخدم.";
pub const ANNOUNCEMENT_HEADER: &str = "📣 إعلان:";

/// Canned call to prayer. Each names the prayer in Latin script as well.
pub fn prayer_call(event: PrayerEvent) -> String {
    let exhortation = match event {
        PrayerEvent::Fajr => "ابدأ يومك بالصلاة، فهي نور.",
        PrayerEvent::Dhuhr => "لا تؤخر صلاتك فهي راحة للقلب.",
        PrayerEvent::Asr => "من حافظ على العصر فهو في حفظ الله.",
        PrayerEvent::Maghrib => "صلاتك نورك يوم القيامة.",
        PrayerEvent::Isha => "نم على طهارة وصلاتك لختام اليوم.",
    };
    format!(
        "🏛 حان الآن وقت صلاة {} ({})\n✨ {}",
        event.arabic_name(),
        event.as_str(),
        exhortation
    )
}

/// Fallback when no canned text is configured for a prayer.
pub fn generic_prayer_call(event: PrayerEvent, time: NaiveTime) -> String {
    format!(
        "🕌 حان الآن وقت صلاة {} ({}) - {}",
        event.arabic_name(),
        event.as_str(),
        format_clock_12h(time)
    )
}

pub fn prayer_times_header(offset_hours: i32) -> String {
    format!("🕌 مواعيد الصلاة (UTC{:+}):", offset_hours)
}

pub fn broadcast_report(delivered: usize, attempted: usize) -> String {
    format!("✅ تم الإرسال إلى {} من {} مشترك.", delivered, attempted)
}

pub fn subscriber_count(count: i64) -> String {
    format!("🔢 عدد المشتركين: {}", count)
}

pub fn invalid_user_id(input: &str) -> String {
    format!("⚠️ «{}» ليس ID صالحًا. أرسل رقمًا فقط، ثم افتح لوحة التحكم من جديد.", input)
}
