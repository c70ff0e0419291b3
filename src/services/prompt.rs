//! 评分提示词构建 - 业务能力层
//!
//! 只负责"构建 system prompt"能力，不关心流程。
//! 提示词正文沿用产品既定的印尼语模板，
//! 输出契约固定为四字段 JSON（nama_file / nilai / kesalahan / feedback）。

/// 根据题目和评分标准构建 system prompt
///
/// # 参数
/// - `soal_text`: 题目内容
/// - `kriteria_text`: 附加评分标准，为空时不生成对应段落
///
/// # 返回
/// 返回完整的评分指令文本（纯函数，结果只取决于入参）
pub fn build_grading_prompt(soal_text: &str, kriteria_text: &str) -> String {
    let kriteria_section = if kriteria_text.is_empty() {
        String::new()
    } else {
        format!(
            "\nKriteria Penilaian Tambahan\n{}\n",
            kriteria_text
        )
    };

    let prompt = format!(
        r#"
Anda adalah seorang asisten penilai kode pemrograman yang ahli, teliti, dan objektif. Tugas Anda adalah menganalisis kode yang diberikan, membandingkannya dengan soal, dan memberikan penilaian serta umpan balik (feedback).

Soal:
{soal_text}
{kriteria_section}
Aturan Penting
1. Sistem Penilaian: Penilaian berawal dari nilai 100 yang selalu dikurang ketika ada kesalahan.
1.  Akurasi Logika: Pastikan kode berfungsi sesuai permintaan soal. Nilai berkurang besar jika terdapat kesalahan logika.
2.  Fokus pada Kesalahan: Fokus mencari kesalahan. Jika terdapat kesalahan fatal yang tidak mengikuti alur perintah soal maka pengurangan cukup besar. Jika program mengikuti alur tapi kesalah simpel, maka hanya penguranan nilai sedikit.
3.  Penanganan Error: Cek apakah ada penanganan untuk input yang tidak valid (pengurangan nilai kecil).

Format Output WAJIB
Hasil penilaian HARUS diberikan dalam format JSON yang valid dengan struktur sebagai berikut. JANGAN tambahkan teks atau penjelasan lain di luar blok JSON.

{{
  "nama_file": "[nama file yang dinilai]",
  "nilai": [nilai akhir dalam format ANGKA 0-100, bukan string],
  "kesalahan": "[kesalahan yang terdapat pada program (jika ada salah)]"
  "feedback": "[feedback singkat, jelas, dan konstruktif mengenai penilaian (jika ada salah) maksimal 3 kalimat]"
}}
"#
    );

    prompt.trim().to_string()
}
