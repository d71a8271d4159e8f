use chrono::{Days, NaiveDate};

pub const HOLY_THURSDAY: &str = "Jueves Santo";
pub const GOOD_FRIDAY: &str = "Viernes Santo";

/// Easter Sunday of the Gregorian calendar (Gauss / anonymous Gregorian algorithm).
pub fn easter_sunday(year: i32) -> Option<NaiveDate> {
    let a = year.rem_euclid(19);
    let b = year.div_euclid(100);
    let c = year.rem_euclid(100);
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;
    NaiveDate::from_ymd_opt(year, u32::try_from(month).ok()?, u32::try_from(day).ok()?)
}

/// Holy Thursday and Good Friday, three and two days before Easter Sunday.
pub fn holy_week(year: i32) -> Option<[(NaiveDate, &'static str); 2]> {
    let easter = easter_sunday(year)?;
    Some([
        (easter.checked_sub_days(Days::new(3))?, HOLY_THURSDAY),
        (easter.checked_sub_days(Days::new(2))?, GOOD_FRIDAY),
    ])
}
