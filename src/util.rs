//! Small utility helpers used across modules.

/// Comma-join a list of ids. The save endpoint expects the selected outcome
/// ids as a single comma-separated string.
pub fn comma_join<S: AsRef<str>>(ids: &[S]) -> String {
  ids.iter().map(|s| s.as_ref()).collect::<Vec<_>>().join(",")
}

/// Log-safe truncation for large strings.
/// Avoids spamming logs with huge request/response payloads.
pub fn trunc_for_log(s: &str, max: usize) -> String {
  if s.len() <= max {
    return s.to_string();
  }
  // Cut on a char boundary; upstream error bodies are not always ASCII.
  let mut cut = max;
  while !s.is_char_boundary(cut) {
    cut -= 1;
  }
  format!("{}… ({} bytes total)", &s[..cut], s.len())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn comma_join_matches_save_payload_shape() {
    assert_eq!(comma_join(&["co-1", "co-2", "co-3"]), "co-1,co-2,co-3");
    assert_eq!(comma_join::<&str>(&[]), "");
    assert_eq!(comma_join(&["only"]), "only");
  }

  #[test]
  fn trunc_for_log_keeps_short_strings() {
    assert_eq!(trunc_for_log("short", 32), "short");
    assert!(trunc_for_log(&"x".repeat(100), 10).starts_with("xxxxxxxxxx…"));
  }

  #[test]
  fn trunc_for_log_backs_off_to_a_char_boundary() {
    // "é" is two bytes, so byte 200 falls mid-character.
    let body = format!("a{}", "é".repeat(150));
    let out = trunc_for_log(&body, 200);
    assert!(out.starts_with('a'));
    assert!(out.contains("301 bytes total"));

    // Every cut point inside a multi-byte run must stay safe.
    let cyrillic = "ошибка сервера".repeat(20);
    for max in 1..8 {
      let _ = trunc_for_log(&cyrillic, max);
    }
  }
}
