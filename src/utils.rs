use chrono::{ DateTime, Local };
use std::{ fs, io::Error, process, time::SystemTime };
use uuid::Uuid;

mod output;
pub use output::*;

/// ファイル名を指定し、ファイルをString形式で読み込む
/// Result型なので、この関数の外側でエラーハンドリングを行うこと
pub fn read_file(filepath: &str) -> Result<String, Error> {
    let file_contents = fs::read_to_string(filepath)?;
    Ok(file_contents)
}

/// タイムスタンプとPIDを使用し、IDを生成する
/// 形式は、%Y%m%d_%H%M%S_PID
pub fn generate_id() -> String {
    let current_time = SystemTime::now();
    let timestamp: DateTime<Local> = current_time.into();
    let time_str = timestamp.format("%Y%m%d_%H%M%S").to_string();

    let pid = process::id();
    format!("{}_{:010}", time_str, pid)
}

/// UUIDを生成する
pub fn generate_uuid() -> Uuid {
    Uuid::now_v7()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_carry_the_process_id() {
        let id = generate_id();
        assert!(id.ends_with(&format!("{:010}", process::id())));
        assert_ne!(generate_uuid(), generate_uuid());
    }
}
