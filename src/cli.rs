use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "seavigil")]
#[command(about = "水中画像強調クライアント", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// 詳細ログを出力
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// 画像/動画を1件強調処理
    Enhance {
        /// 入力ファイル
        #[arg(required = true)]
        file: PathBuf,

        /// 強調後の画像の保存先
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// モデルを通さず入力をそのまま返す（パイプライン検証用）
        #[arg(long)]
        passthrough: bool,

        /// ステップ表示の間隔（ミリ秒、0で待機なし）
        #[arg(long)]
        interval_ms: Option<u64>,

        /// 強調に失敗した場合はエラー終了する
        #[arg(long)]
        strict: bool,

        /// 結果をJSONで出力
        #[arg(long)]
        json: bool,
    },

    /// フォルダ内の画像/動画を順番に強調処理
    Batch {
        /// 入力フォルダ
        #[arg(required = true)]
        folder: PathBuf,

        /// 出力フォルダ（省略時: 入力フォルダ/enhanced）
        #[arg(short, long)]
        output_dir: Option<PathBuf>,

        /// モデルを通さず入力をそのまま返す
        #[arg(long)]
        passthrough: bool,

        /// ステップ表示の間隔（ミリ秒、0で待機なし）
        #[arg(long)]
        interval_ms: Option<u64>,
    },

    /// サーバーの稼働確認
    Health,

    /// 設定を表示/編集
    Config {
        /// 接続先URLを設定
        #[arg(long)]
        set_base_url: Option<String>,

        /// 設定を表示
        #[arg(long)]
        show: bool,
    },
}
