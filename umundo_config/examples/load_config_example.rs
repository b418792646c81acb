//! 配置加载示例
//!
//! 演示如何从文件加载配置并使用环境变量覆盖

use umundo_config::{DuplicatePolicy, UmundoConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("=== uMundo 配置加载示例 ===\n");

    // 示例 1: 使用默认配置
    println!("1. 使用默认配置:");
    let config = UmundoConfig::default();
    println!("   域: {}", config.transport.domain);
    println!("   队列容量: {}", config.transport.queue_capacity);
    println!();

    // 示例 2: 从文件加载配置
    println!("2. 从文件加载配置:");
    match UmundoConfig::from_file_with_env("umundo_config/examples/umundo.toml") {
        Ok(config) => {
            println!("   ✓ 配置加载成功");
            println!("{}", config.summary());
        }
        Err(e) => {
            println!("   ✗ 配置加载失败: {}", e);
        }
    }
    println!();

    // 示例 3: 无效配置
    println!("3. 无效配置示例:");
    let mut invalid = UmundoConfig::default();
    invalid.transport.queue_capacity = 0;
    invalid.s11n.duplicate_policy = DuplicatePolicy::Reject;
    match invalid.validate() {
        Ok(_) => println!("   ✓ 配置有效"),
        Err(e) => println!("   ✗ 配置无效: {}", e),
    }

    Ok(())
}
