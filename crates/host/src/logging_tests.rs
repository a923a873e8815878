use super::*;

#[test]
fn level_table_maps_0_through_5() {
    assert_eq!(level_from_u8(0), LogLevel::Debug);
    assert_eq!(level_from_u8(1), LogLevel::Info);
    assert_eq!(level_from_u8(2), LogLevel::Warning);
    assert_eq!(level_from_u8(3), LogLevel::Error);
    assert_eq!(level_from_u8(4), LogLevel::Critical);
    assert_eq!(level_from_u8(5), LogLevel::Off);
}

#[test]
fn levels_past_5_are_also_off() {
    assert_eq!(level_from_u8(9), LogLevel::Off);
    assert_eq!(level_from_u8(255), LogLevel::Off);
}

#[test]
fn off_maps_to_the_off_filter() {
    assert_eq!(LogLevel::Off.to_filter(), LevelFilter::OFF);
}

#[test]
fn error_and_critical_both_map_to_the_error_filter() {
    assert_eq!(LogLevel::Error.to_filter(), LevelFilter::ERROR);
    assert_eq!(LogLevel::Critical.to_filter(), LevelFilter::ERROR);
}
