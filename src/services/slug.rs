//! # 유니코드 slug 생성
//!
//! 이름/제목을 URL에 쓸 수 있는 slug로 바꿉니다.
//! ASCII로 음역하지 않고 모든 문자 체계의 글자를 그대로 남깁니다.
//! 예: "Hello, World!" → "hello-world", "Rust 入門" → "rust-入門"

/// 규칙:
/// 1. 글자·숫자·`_`·`-`·공백 외의 문자는 제거
/// 2. 소문자로 변환
/// 3. 공백과 `-`가 이어진 구간은 `-` 하나로 압축
/// 4. 앞뒤의 `-`, `_`는 제거
pub fn slugify(value: &str) -> String {
    let mut slug = String::with_capacity(value.len());
    let mut pending_dash = false;

    for c in value.chars() {
        if c.is_alphanumeric() || c == '_' {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(c.to_lowercase());
        } else if c.is_whitespace() || c == '-' {
            pending_dash = true;
        }
    }

    slug.trim_matches(|c| c == '-' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ascii_titles() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("  Django  --  API  "), "django-api");
    }

    #[test]
    fn keeps_non_latin_scripts() {
        assert_eq!(slugify("プログラミング"), "プログラミング");
        assert_eq!(slugify("나의 첫 글"), "나의-첫-글");
        assert_eq!(slugify("Rust 入門"), "rust-入門");
    }

    #[test]
    fn punctuation_only_is_empty() {
        assert_eq!(slugify("!!!"), "");
    }
}
