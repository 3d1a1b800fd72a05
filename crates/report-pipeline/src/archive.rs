//! 결과 기록 및 아카이브 이동
//!
//! - [`write_result`]: 입력 파일 이름의 확장자를 `.json`으로 바꿔 결과 디렉토리에 기록
//! - [`move_file`]: 입력 파일을 아카이브 디렉토리로 복사한 뒤 원본 삭제
//!
//! 두 함수 모두 대상 디렉토리가 없으면 생성합니다.

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::ReportPipelineError;

/// 결과 파일 확장자
pub const RESULT_EXTENSION: &str = "json";

/// 입력 파일 이름에서 결과 파일 이름을 만듭니다 (`report1.txt` -> `report1.json`).
pub fn result_file_name(name: &str) -> PathBuf {
    Path::new(name).with_extension(RESULT_EXTENSION)
}

/// 결과 내용을 `dir/<stem>.json`에 기록하고 기록한 경로를 반환합니다.
pub async fn write_result(
    name: &str,
    dir: impl AsRef<Path>,
    content: &[u8],
) -> Result<PathBuf, ReportPipelineError> {
    let dir = dir.as_ref();
    ensure_dir(dir).await?;

    let path = dir.join(result_file_name(name));
    tokio::fs::write(&path, content)
        .await
        .map_err(|source| ReportPipelineError::Archive {
            op: "write result",
            path: path.clone(),
            source,
        })?;

    debug!(file = %path.display(), bytes = content.len(), "result written");
    Ok(path)
}

/// `src_dir/name`을 `dest_dir/name`으로 옮기고 새 경로를 반환합니다.
///
/// 복사가 성공한 뒤에만 원본을 삭제하므로, 복사 실패 시 원본은 그대로 남습니다.
pub async fn move_file(
    name: &str,
    src_dir: impl AsRef<Path>,
    dest_dir: impl AsRef<Path>,
) -> Result<PathBuf, ReportPipelineError> {
    let dest_dir = dest_dir.as_ref();
    ensure_dir(dest_dir).await?;

    let src = src_dir.as_ref().join(name);
    let dest = dest_dir.join(name);

    tokio::fs::copy(&src, &dest)
        .await
        .map_err(|source| ReportPipelineError::Archive {
            op: "copy",
            path: src.clone(),
            source,
        })?;

    tokio::fs::remove_file(&src)
        .await
        .map_err(|source| ReportPipelineError::Archive {
            op: "remove source",
            path: src.clone(),
            source,
        })?;

    debug!(from = %src.display(), to = %dest.display(), "file archived");
    Ok(dest)
}

async fn ensure_dir(dir: &Path) -> Result<(), ReportPipelineError> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|source| ReportPipelineError::Archive {
            op: "create dir",
            path: dir.to_path_buf(),
            source,
        })
}
