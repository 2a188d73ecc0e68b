//! Resource naming policy.
//!
//! Uploaded images are stored under names derived from the client-supplied
//! filename. The derivation is deterministic:
//!
//! 1. drop directory components and a trailing `.png` / `.PNG`;
//! 2. keep only ASCII letters and digits;
//! 3. fall back to `image` if the result is not a valid page name;
//! 4. on collision append the smallest positive integer not in use.

use nifki_core::is_valid_page_name;

/// Name used when the suggested filename yields nothing usable.
pub const FALLBACK_RESOURCE_NAME: &str = "image";

/// Derives the stored name for a new resource.
///
/// `existing` holds the names already stored for the page.
pub fn resource_name<S: AsRef<str>>(suggested: &str, existing: &[S]) -> String {
    let base = suggested.rsplit(['/', '\\']).next().unwrap_or(suggested);
    let base = base
        .strip_suffix(".png")
        .or_else(|| base.strip_suffix(".PNG"))
        .unwrap_or(base);
    let mut name: String = base.chars().filter(|c| c.is_ascii_alphanumeric()).collect();
    if !is_valid_page_name(&name) {
        name = FALLBACK_RESOURCE_NAME.to_string();
    }

    let taken = |candidate: &str| existing.iter().any(|e| e.as_ref() == candidate);
    if !taken(&name) {
        return name;
    }
    (1u64..)
        .map(|count| format!("{name}{count}"))
        .find(|candidate| !taken(candidate))
        .unwrap_or(name)
}

/// Returns whether `name` could have been produced by [`resource_name`].
///
/// Collision suffixes can push a name past the page-name length limit, so
/// this only requires a non-empty run of ASCII letters and digits.
pub fn is_valid_resource_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(|c| c.is_ascii_alphanumeric())
}

#[cfg(test)]
mod tests {
    use super::*;

    const NONE: [&str; 0] = [];

    #[test]
    fn strips_directories_and_png_extension() {
        assert_eq!(resource_name("logo.png", &NONE), "logo");
        assert_eq!(resource_name("/home/me/pics/Ship.PNG", &NONE), "Ship");
        assert_eq!(resource_name("C:\\Users\\me\\rock.png", &NONE), "rock");
    }

    #[test]
    fn only_exact_png_suffixes_are_stripped() {
        assert_eq!(resource_name("tiles.Png", &NONE), "tilesPng");
        assert_eq!(resource_name("hero.gif", &NONE), "herogif");
    }

    #[test]
    fn removes_non_alphanumerics() {
        assert_eq!(resource_name("cool_sprite-2.png", &NONE), "coolsprite2");
    }

    #[test]
    fn unusable_names_fall_back_to_image() {
        assert_eq!(resource_name("x.png", &NONE), "image");
        assert_eq!(resource_name("42.png", &NONE), "image");
        assert_eq!(resource_name("BIG.png", &NONE), "image");
        assert_eq!(resource_name(".png", &NONE), "image");
        assert_eq!(
            resource_name("averyveryverylongfilename.png", &NONE),
            "image"
        );
    }

    #[test]
    fn collisions_take_smallest_free_suffix() {
        assert_eq!(resource_name("logo.png", &["logo"]), "logo1");
        assert_eq!(resource_name("logo.png", &["logo", "logo1"]), "logo2");
        assert_eq!(resource_name("logo.png", &["logo", "logo2"]), "logo1");
        let taken = ["image", "image1", "image2"];
        assert_eq!(resource_name("x.png", &taken), "image3");
    }

    #[test]
    fn resource_name_rules() {
        assert!(is_valid_resource_name("logo1"));
        assert!(is_valid_resource_name("abcdefghijklmnopqrst1"));
        assert!(!is_valid_resource_name(""));
        assert!(!is_valid_resource_name("../secret"));
        assert!(!is_valid_resource_name("a.png"));
    }
}
