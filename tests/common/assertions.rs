//! 自定义断言辅助模块
//!
//! 提供测试中的常用断言函数

use std::collections::HashSet;
use std::hash::Hash;

/// 断言结果成功，返回内部值
pub fn assert_ok<T, E: std::fmt::Debug>(result: Result<T, E>) -> T {
    result.expect("操作应该成功")
}

/// 断言结果失败并匹配错误消息
pub fn assert_err_with<T: std::fmt::Debug, E: std::fmt::Display>(result: Result<T, E>, expected_msg: &str) {
    let err = result.expect_err("操作应该失败");
    let err_str = err.to_string();
    assert!(
        err_str.contains(expected_msg),
        "错误消息应包含 '{}', 实际是 '{}'",
        expected_msg,
        err_str
    );
}

/// 断言集合包含指定数量的元素
pub fn assert_count<T>(collection: &[T], expected: usize, item_name: &str) {
    assert_eq!(
        collection.len(),
        expected,
        "{}数量不匹配: 期望 {}, 实际 {}",
        item_name,
        expected,
        collection.len()
    );
}

/// 断言两个集合元素相同，忽略顺序
pub fn assert_same_elements<T: Eq + Hash + std::fmt::Debug + Clone>(actual: &[T], expected: &[T]) {
    let actual_set: HashSet<T> = actual.iter().cloned().collect();
    let expected_set: HashSet<T> = expected.iter().cloned().collect();
    assert_eq!(actual_set, expected_set, "集合元素不匹配");
}
