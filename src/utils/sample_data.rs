use rand::Rng;
use rust_decimal::Decimal;
use serde_json::Map;

use crate::models::Product;

const DESCRIPTIONS: [&str; 5] = [
    "高性能工业控制器，适用于自动化生产线，支持多种通信协议",
    "智能传感器模块，支持多种数据采集，实时监控生产状态",
    "精密加工零部件，符合工业4.0标准，高精度制造工艺",
    "工业级通信设备，稳定可靠，支持远程监控和数据传输",
    "自动化控制系统核心组件，模块化设计，易于维护升级",
];

const WORK_PLANS: [&str; 5] = [
    "第一装配 - 对箍 - 蛋芯\n加热时间：5S\n加热次数：3次\n装配时间：25S\n装配/冷却：1次",
    "组装外壳 - 安装芯片 - 测试\n测试时间：3S\n测试次数：2次\n组装时间：18S\n质检时间：10S",
    "电池装配 - 电路连接 - 外壳组装\n充电测试：10S\n电路检测：5次\n组装时间：30S\n安全检测：15S",
    "传感器安装 - 表带装配 - 系统调试\n调试时间：8S\n测试次数：4次\n装配时间：20S\n防水测试：12S",
    "线圈安装 - 电路调试 - 外壳封装\n功率测试：6S\n兼容测试：3次\n装配时间：15S\n安全检测：8S",
];

const PRODUCT_NAMES: [&str; 10] = [
    "智能保温杯",
    "无线蓝牙耳机",
    "便携充电宝",
    "运动手环",
    "无线充电器",
    "蓝牙音箱",
    "智能手表",
    "移动硬盘",
    "无线鼠标",
    "机械键盘",
];

const CATEGORIES: [&str; 5] = ["生活用品", "数码产品", "智能穿戴", "存储设备", "办公用品"];

const TAG_MAP: [(&str, [&str; 3]); 10] = [
    ("保温杯", ["智能", "保温", "304不锈钢"]),
    ("蓝牙耳机", ["蓝牙", "降噪", "音质"]),
    ("充电宝", ["大容量", "快充", "便携"]),
    ("手环", ["心率监测", "防水", "运动"]),
    ("充电器", ["无线充电", "快充", "兼容性"]),
    ("音箱", ["环绕音效", "防水", "蓝牙"]),
    ("手表", ["智能", "通话", "健康监测"]),
    ("硬盘", ["大容量", "高速", "便携"]),
    ("鼠标", ["无线", "人体工学", "静音"]),
    ("键盘", ["机械键盘", "RGB", "游戏"]),
];

const DEFAULT_TAGS: [&str; 3] = ["产品", "质量", "实用"];

/// 根据产品名称生成标签
pub fn product_tags(product_name: &str) -> Vec<String> {
    let tags = TAG_MAP
        .iter()
        .find(|(key, _)| product_name.contains(key))
        .map(|(_, tags)| tags)
        .unwrap_or(&DEFAULT_TAGS);
    tags.iter().map(|t| t.to_string()).collect()
}

/// 生成示例数据：名称/描述/工作计划按序轮换，价格、销量、上架状态与分类随机
pub fn generate_sample_products(count: usize) -> Vec<Product> {
    generate_sample_products_with(&mut rand::thread_rng(), count)
}

pub fn generate_sample_products_with<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Product> {
    (1..=count)
        .map(|i| {
            let name = PRODUCT_NAMES[(i - 1) % PRODUCT_NAMES.len()];
            let description = DESCRIPTIONS[(i - 1) % DESCRIPTIONS.len()];
            let work_plan = WORK_PLANS[(i - 1) % WORK_PLANS.len()];
            // 价格区间 [100, 900)，保留两位小数
            let price_cents: i64 = rng.gen_range(10_000..90_000);
            let product_name = if i > 10 {
                format!("{name} {}代", i / 10)
            } else {
                name.to_string()
            };

            Product {
                id: format!("P{i:03}"),
                product_name,
                price: Decimal::new(price_cents, 2),
                work_plan: work_plan.to_string(),
                work_plan_id: String::new(),
                description: format!("{description}（{name}专用型号）"),
                status: rng.gen_bool(0.7),
                image: format!("https://picsum.photos/200/200?random={i}"),
                sales: rng.gen_range(100..5_100),
                category: CATEGORIES[rng.gen_range(0..CATEGORIES.len())].to_string(),
                tags: product_tags(name),
                custom_fields: Map::new(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn test_generate_sample_products_shape() {
        let mut rng = StdRng::seed_from_u64(7);
        let products = generate_sample_products_with(&mut rng, 12);
        assert_eq!(products.len(), 12);
        assert_eq!(products[0].id, "P001");
        assert_eq!(products[0].product_name, "智能保温杯");
        assert_eq!(products[10].id, "P011");
        assert_eq!(products[10].product_name, "智能保温杯 1代");
        for product in &products {
            assert!(product.price >= Decimal::new(100, 0));
            assert!(product.price < Decimal::new(900, 0));
            assert!((100..5_100).contains(&product.sales));
            assert!(CATEGORIES.contains(&product.category.as_str()));
            assert_eq!(product.tags.len(), 3);
        }
    }

    #[test]
    fn test_product_tags() {
        assert_eq!(product_tags("无线蓝牙耳机"), vec!["蓝牙", "降噪", "音质"]);
        assert_eq!(product_tags("未知产品"), vec!["产品", "质量", "实用"]);
    }
}
