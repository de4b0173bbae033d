//! 文件/目录扫描与并行调度
use anyhow::{Context, Result};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

use crate::options::{OutputFormat, ScanOptions, ScanStats};
use crate::policy::DEFAULT_POLICY;
use crate::report::{findings_for, Finding};
use crate::scan::scan_source;
use crate::source::SourceText;

/// 收集待扫描文件
/// - 显式给出的文件总是扫描
/// - 目录递归遍历，仅保留扩展名在 `extensions` 中的文件
/// - 按路径排序，确保输出顺序可复现
/// - 既不是文件也不是目录的参数直接报错，避免拼错路径时“零命中”通过
pub fn collect_files(paths: &[PathBuf], opts: &ScanOptions) -> Result<Vec<PathBuf>> {
    let mut files: Vec<PathBuf> = vec![];
    for root in paths {
        let md = std::fs::metadata(root).with_context(|| format!("cannot access {}", root.display()))?;
        if md.is_file() {
            files.push(root.clone());
            continue;
        }
        if !md.is_dir() {
            anyhow::bail!("{} is neither a file nor a directory", root.display());
        }
        let mut found: Vec<PathBuf> = vec![];
        for entry in WalkDir::new(root).min_depth(1) {
            let entry = match entry {
                Ok(e) => e,
                Err(err) => {
                    warn!(%err, "skipping unreadable entry");
                    continue;
                }
            };
            if entry.file_type().is_file() && has_wanted_extension(entry.path(), &opts.extensions) {
                found.push(entry.into_path());
            }
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn has_wanted_extension(path: &Path, extensions: &[String]) -> bool {
    match path.extension().and_then(|e| e.to_str()) {
        Some(ext) => extensions.iter().any(|want| want.eq_ignore_ascii_case(ext)),
        None => false,
    }
}

/// 扫描单个文件并生成报告记录
pub fn scan_file(path: &Path) -> Result<Vec<Finding>> {
    let buf = std::fs::read(path).with_context(|| format!("read {}", path.display()))?;
    let src = SourceText::from_bytes(&buf).with_context(|| format!("decode {}", path.display()))?;
    let result = scan_source(&src, &DEFAULT_POLICY).with_context(|| format!("scan {}", path.display()))?;
    Ok(findings_for(&path.display().to_string(), src.as_str(), &result))
}

/// 单文件的处理结果：None 表示跳过
fn scan_one(path: &Path, max_file_size: Option<u64>) -> Option<Vec<Finding>> {
    if let Some(max) = max_file_size {
        if let Ok(md) = std::fs::metadata(path) {
            if md.len() > max {
                debug!(path = %path.display(), size = md.len(), "skipping large file");
                return None;
            }
        }
    }
    match scan_file(path) {
        Ok(findings) => Some(findings),
        Err(err) => {
            warn!(path = %path.display(), "skipping file: {err:#}");
            None
        }
    }
}

/// 按格式写出命中项
struct FindingWriter<'a> {
    out: &'a mut dyn Write,
    format: OutputFormat,
    first: bool,
}

impl<'a> FindingWriter<'a> {
    fn begin(out: &'a mut dyn Write, format: OutputFormat) -> Result<Self> {
        if format == OutputFormat::Json {
            write!(out, "[")?;
        }
        Ok(Self { out, format, first: true })
    }

    fn write_all(&mut self, findings: &[Finding], stats: &mut ScanStats) -> Result<()> {
        for f in findings {
            stats.findings_written += 1;
            match self.format {
                OutputFormat::Json => {
                    if !self.first { write!(self.out, ",")?; } else { self.first = false; }
                    serde_json::to_writer(&mut *self.out, f)?;
                }
                OutputFormat::Text => writeln!(self.out, "{f}")?,
            }
        }
        Ok(())
    }

    fn finish(self) -> Result<()> {
        if self.format == OutputFormat::Json {
            write!(self.out, "]")?;
        }
        Ok(())
    }
}

/// 扫描路径列表并将结果写入 `out`
/// 稳定性保证：文件按 `collect_files` 的顺序输出，文件内按码点下标升序
pub fn scan_and_write(paths: &[PathBuf], out: &mut dyn Write, opts: &ScanOptions) -> Result<ScanStats> {
    let files = collect_files(paths, opts)?;
    let mut stats = ScanStats::default();
    let threads = opts.threads.unwrap_or_else(num_cpus::get);
    debug!(files = files.len(), threads, "collected files");

    let mut writer = FindingWriter::begin(out, opts.format)?;
    if threads > 1 && files.len() > 1 {
        scan_parallel(&files, &mut writer, opts, &mut stats, threads)?;
    } else {
        for path in &files {
            match scan_one(path, opts.max_file_size) {
                Some(findings) => {
                    stats.files_scanned += 1;
                    writer.write_all(&findings, &mut stats)?;
                }
                None => stats.files_skipped += 1,
            }
        }
    }
    writer.finish()?;
    Ok(stats)
}

/// 并行调度：
/// - 后台线程内用 Rayon 线程池并行扫描
/// - 当前线程作为唯一 Writer，按 idx 重排后流式写出，顺序与串行一致
fn scan_parallel(
    files: &[PathBuf],
    writer: &mut FindingWriter<'_>,
    opts: &ScanOptions,
    stats: &mut ScanStats,
    threads: usize,
) -> Result<()> {
    use crossbeam_channel as channel;
    use rayon::prelude::*;
    use std::collections::BTreeMap;

    type Msg = (usize /*idx*/, Option<Vec<Finding>> /*None=skipped*/);
    let (tx, rx) = channel::bounded::<Msg>(256);

    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("build rayon pool")?;
    let files_vec: Vec<PathBuf> = files.to_vec();
    let max_file_size = opts.max_file_size;

    let scan_thread = std::thread::spawn(move || {
        pool.install(|| {
            files_vec.par_iter().enumerate().for_each(|(idx, path)| {
                let _ = tx.send((idx, scan_one(path, max_file_size)));
            });
        });
        // 结束后 Sender 全部被丢弃，Receiver 将收到关闭信号
    });

    let mut next_idx: usize = 0;
    let mut buffer: BTreeMap<usize, Option<Vec<Finding>>> = BTreeMap::new();
    while let Ok((idx, res)) = rx.recv() {
        buffer.insert(idx, res);
        while let Some(res) = buffer.remove(&next_idx) {
            match res {
                Some(findings) => {
                    stats.files_scanned += 1;
                    writer.write_all(&findings, stats)?;
                }
                None => stats.files_skipped += 1,
            }
            next_idx += 1;
        }
    }

    if scan_thread.join().is_err() {
        anyhow::bail!("scan worker panicked");
    }
    if next_idx != files.len() {
        anyhow::bail!("only {next_idx} of {} files were reported", files.len());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn tree() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("dont_check_here.py"), "\x01").unwrap();
        fs::create_dir_all(dir.path().join("src/subdir")).unwrap();
        fs::write(dir.path().join("src/source.py"), "\x02").unwrap();
        fs::write(dir.path().join("src/subdir/source1.py"), "\x03").unwrap();
        fs::write(dir.path().join("src/subdir/source2.py"), "\x04").unwrap();
        fs::write(dir.path().join("src/subdir/otherfile.bin"), "\x05").unwrap();
        dir
    }

    #[test]
    fn walks_directory_by_extension() {
        let dir = tree();
        let opts = ScanOptions { extensions: vec!["py".into()], ..Default::default() };
        let files = collect_files(&[dir.path().join("src")], &opts).unwrap();
        let names: Vec<String> = files
            .iter()
            .map(|p| p.strip_prefix(dir.path()).unwrap().display().to_string())
            .collect();
        assert_eq!(names, vec!["src/source.py", "src/subdir/source1.py", "src/subdir/source2.py"]);
    }

    #[test]
    fn explicit_file_ignores_extension_filter() {
        let dir = tree();
        let bin = dir.path().join("src/subdir/otherfile.bin");
        let files = collect_files(&[bin.clone()], &ScanOptions::default()).unwrap();
        assert_eq!(files, vec![bin]);
    }

    #[test]
    fn missing_path_is_an_error() {
        let dir = tree();
        let typo = dir.path().join("src/sorce.py");
        let err = collect_files(&[dir.path().join("src"), typo.clone()], &ScanOptions::default()).unwrap_err();
        assert!(err.to_string().contains("sorce.py"));

        let mut out = Vec::new();
        assert!(scan_and_write(&[typo], &mut out, &ScanOptions::default()).is_err());
        assert!(out.is_empty());
    }

    #[test]
    fn scan_file_reports_codepoint_positions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("e.py");
        fs::write(&path, "A\u{1F600}\0\n").unwrap();
        let found = scan_file(&path).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!((found[0].index, found[0].row, found[0].col), (2, 1, 2));
    }

    #[test]
    fn serial_and_parallel_output_match() {
        let dir = tree();
        let paths = vec![dir.path().join("src")];
        let mut serial = Vec::new();
        let opts = ScanOptions { threads: Some(1), ..Default::default() };
        let s1 = scan_and_write(&paths, &mut serial, &opts).unwrap();
        let mut parallel = Vec::new();
        let opts = ScanOptions { threads: Some(4), ..Default::default() };
        let s2 = scan_and_write(&paths, &mut parallel, &opts).unwrap();
        assert_eq!(serial, parallel);
        assert_eq!(s1, s2);
        assert_eq!(s1.files_scanned, 3);
        assert_eq!(s1.findings_written, 3);
    }

    #[test]
    fn json_output_is_an_array() {
        let dir = tree();
        let mut out = Vec::new();
        let opts = ScanOptions { format: OutputFormat::Json, threads: Some(1), ..Default::default() };
        scan_and_write(&[dir.path().join("src/source.py")], &mut out, &opts).unwrap();
        let v: serde_json::Value = serde_json::from_slice(&out).unwrap();
        let arr = v.as_array().unwrap();
        assert_eq!(arr.len(), 1);
        assert_eq!(arr[0]["kind"], "ControlChar");
        assert_eq!(arr[0]["row"], 1);
        assert_eq!(arr[0]["col"], 0);
    }

    #[test]
    fn non_utf8_and_large_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("bad.py"), b"\xff\xfe").unwrap();
        fs::write(dir.path().join("big.py"), "x".repeat(64)).unwrap();
        fs::write(dir.path().join("ok.py"), "ok\n").unwrap();
        let mut out = Vec::new();
        let opts = ScanOptions { max_file_size: Some(16), threads: Some(1), ..Default::default() };
        let stats = scan_and_write(&[dir.path().to_path_buf()], &mut out, &opts).unwrap();
        assert_eq!(stats.files_scanned, 1);
        assert_eq!(stats.files_skipped, 2);
        assert!(out.is_empty());
        assert!(scan_file(&dir.path().join("bad.py")).is_err());
    }
}
