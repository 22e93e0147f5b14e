//! 페이지 번호 기반 페이지네이션 계산

use crate::error::AppError;

/// 검증을 마친 페이지 위치
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub number: i64,
    pub total_pages: i64,
    pub size: i64,
}

impl Page {
    /// 전체 개수와 요청한 페이지 번호로 페이지를 계산합니다.
    ///
    /// 결과가 0건이어도 첫 페이지(1/1)는 유효합니다.
    /// 범위를 벗어난 페이지는 `NotFound`입니다.
    pub fn resolve(requested: i64, size: i64, total_count: i64) -> Result<Self, AppError> {
        // size가 i64::MAX에 가까워도 넘치지 않는 올림 나눗셈
        let total_pages = if total_count <= 0 {
            1
        } else {
            (total_count - 1) / size + 1
        };

        if requested < 1 || requested > total_pages {
            return Err(AppError::NotFound);
        }

        Ok(Self {
            number: requested,
            total_pages,
            size,
        })
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.size
    }
}
